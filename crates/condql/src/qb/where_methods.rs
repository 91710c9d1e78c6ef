/// Generate the WHERE helpers shared by SELECT, UPDATE and DELETE builders.
///
/// The implementing type needs `where_clause: WhereClause` and
/// `build_error: Option<BuildError>` fields. Invalid input is recorded as the
/// first build error and surfaced by `build()`.
macro_rules! impl_where_methods {
    () => {
        fn push_where(
            mut self,
            condition: $crate::error::BuildResult<$crate::condition::Condition>,
            connector: Option<$crate::condition::Logic>,
        ) -> Self {
            match condition {
                Ok(c) => match connector {
                    None => self.where_clause.push(c),
                    Some($crate::condition::Logic::And) => self.where_clause.and(c),
                    Some($crate::condition::Logic::Or) => self.where_clause.or(c),
                },
                Err(e) => {
                    if self.build_error.is_none() {
                        self.build_error = Some(e);
                    }
                }
            }
            self
        }

        /// Add a prepared condition.
        pub fn where_cond(self, condition: $crate::condition::Condition) -> Self {
            self.push_where(Ok(condition), None)
        }

        /// Add a prepared condition joined with OR.
        pub fn or_where(self, condition: $crate::condition::Condition) -> Self {
            self.push_where(Ok(condition), Some($crate::condition::Logic::Or))
        }

        /// Make the next `where_*` call join with `logic` instead of AND.
        pub fn token(mut self, logic: $crate::condition::Logic) -> Self {
            self.where_clause.token(logic);
            self
        }

        /// Add WHERE: column = value (list -> IN, null -> IS NULL)
        pub fn where_eq(
            self,
            column: &str,
            value: impl Into<$crate::value::ConditionValue>,
        ) -> Self {
            self.push_where($crate::condition::Condition::eq(column, value), None)
        }

        /// Add OR: column = value
        pub fn or_where_eq(
            self,
            column: &str,
            value: impl Into<$crate::value::ConditionValue>,
        ) -> Self {
            self.push_where(
                $crate::condition::Condition::eq(column, value),
                Some($crate::condition::Logic::Or),
            )
        }

        /// Add WHERE from `(column, value)` pairs (implicit AND).
        pub fn where_map<I, C, V>(self, entries: I) -> Self
        where
            I: IntoIterator<Item = (C, V)>,
            C: $crate::ident::IntoIdent,
            V: Into<$crate::value::ConditionValue>,
        {
            self.push_where($crate::condition::Condition::map(entries), None)
        }

        /// Add WHERE: column OP value, with a textual operator.
        pub fn where_op(
            self,
            column: &str,
            op: &str,
            value: impl Into<$crate::value::ConditionValue>,
        ) -> Self {
            self.push_where($crate::condition::Condition::op(column, op, value), None)
        }

        /// Add OR: column OP value
        pub fn or_where_op(
            self,
            column: &str,
            op: &str,
            value: impl Into<$crate::value::ConditionValue>,
        ) -> Self {
            self.push_where(
                $crate::condition::Condition::op(column, op, value),
                Some($crate::condition::Logic::Or),
            )
        }

        /// Add WHERE: column IN (values...)
        pub fn where_in<T: Into<$crate::value::Value>>(
            self,
            column: &str,
            values: impl IntoIterator<Item = T>,
        ) -> Self {
            self.push_where($crate::condition::Condition::in_list(column, values), None)
        }

        /// Add WHERE: column NOT IN (values...)
        pub fn where_not_in<T: Into<$crate::value::Value>>(
            self,
            column: &str,
            values: impl IntoIterator<Item = T>,
        ) -> Self {
            self.push_where($crate::condition::Condition::not_in(column, values), None)
        }

        /// Add WHERE: column BETWEEN from AND to
        pub fn where_between(
            self,
            column: &str,
            from: impl Into<$crate::value::Value>,
            to: impl Into<$crate::value::Value>,
        ) -> Self {
            self.push_where($crate::condition::Condition::between(column, from, to), None)
        }

        /// Add WHERE: column IS NULL
        pub fn where_null(self, column: &str) -> Self {
            self.push_where($crate::condition::Condition::is_null(column), None)
        }

        /// Add WHERE: column LIKE %value% (ILIKE on adapted Postgres)
        pub fn where_like(self, column: &str, value: impl Into<$crate::value::Value>) -> Self {
            self.push_where($crate::condition::Condition::like(column, value), None)
        }

        /// Add WHERE: column NOT LIKE %value%
        pub fn where_not_like(
            self,
            column: &str,
            value: impl Into<$crate::value::Value>,
        ) -> Self {
            self.push_where($crate::condition::Condition::not_like(column, value), None)
        }

        /// Add a WHERE condition from its JSON description.
        pub fn where_json(self, json: &serde_json::Value) -> Self {
            self.push_where($crate::condition::Condition::from_json(json), None)
        }

        /// Add a raw WHERE fragment without params.
        pub fn where_raw(self, sql: &str) -> Self {
            self.push_where(Ok($crate::condition::Condition::raw(sql)), None)
        }

        /// Add a raw WHERE fragment with its own `:name` params.
        pub fn where_raw_with<N: Into<String>, V: Into<$crate::value::Value>>(
            self,
            sql: &str,
            params: impl IntoIterator<Item = (N, V)>,
        ) -> Self {
            self.push_where(
                Ok($crate::condition::Condition::raw_with(sql, params)),
                None,
            )
        }

        /// Add a condition if value is Some: column = value
        pub fn where_eq_opt<T: Into<$crate::value::ConditionValue>>(
            self,
            column: &str,
            value: Option<T>,
        ) -> Self {
            match value {
                Some(v) => self.where_eq(column, v),
                None => self,
            }
        }

        /// Add a condition if value is Some: column LIKE %value%
        pub fn where_like_opt<T: Into<$crate::value::Value>>(
            self,
            column: &str,
            value: Option<T>,
        ) -> Self {
            match value {
                Some(v) => self.where_like(column, v),
                None => self,
            }
        }
    };
}
