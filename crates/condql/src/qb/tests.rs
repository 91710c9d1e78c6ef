//! Integration tests for the qb module.

use crate::compiler::Compiler;
use crate::condition::{Condition, Logic};
use crate::dialect::Dialect;
use crate::qb::{SqlQb, delete, insert, select, unique_check, update};
use crate::value::Value;

#[test]
fn test_select_basic() {
    let qb = select("users");
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM users");
}

#[test]
fn test_select_with_conditions() {
    let qb = select("users")
        .where_eq("status", "active")
        .where_op("age", ">", 18)
        .limit(10);

    let sql = qb.to_sql().unwrap();
    assert!(sql.contains("SELECT * FROM users"));
    assert!(sql.contains("WHERE"));
    assert!(sql.contains("status = :p_1_status"));
    assert!(sql.contains("age > :p_2_age"));
    assert!(sql.contains("LIMIT 10"));
}

#[test]
fn test_complex_where_condition() {
    let cond = Condition::and(vec![
        Condition::eq("status", "active").unwrap(),
        Condition::or(vec![
            Condition::eq("role", "admin").unwrap(),
            Condition::and(vec![
                Condition::eq("role", "user").unwrap(),
                Condition::op("reputation", ">", 100).unwrap(),
            ]),
        ]),
    ]);

    let mut qb = select("users").where_cond(cond);
    let built = qb.build().unwrap();

    assert_eq!(
        built.sql,
        "SELECT * FROM users WHERE (status = :p_1_status AND (role = :p_2_role OR (role = :p_3_role AND reputation > :p_4_reputation)))"
    );
    assert_eq!(built.params.len(), 4);
}

#[test]
fn test_or_where_and_token() {
    let qb = select("users")
        .where_eq("a", 1)
        .or_where_eq("b", 2)
        .token(Logic::Or)
        .where_null("c")
        .where_eq("d", 4);

    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM users WHERE a = :p_1_a OR b = :p_2_b OR c IS NULL AND d = :p_3_d"
    );
}

#[test]
fn test_where_map_and_json() {
    let qb = select("users")
        .where_map([("status", Value::from("active")), ("deleted_at", Value::Null)])
        .where_json(&serde_json::json!(["LIKE", "name", "ann"]));

    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM users WHERE status = :p_1_status AND deleted_at IS NULL AND name LIKE :p_2_name"
    );
}

#[test]
fn test_like_adapts_on_postgres() {
    let pg = Compiler::new(Dialect::Postgres);
    let mut qb = pg.select("users").where_like("name", "ann");
    let built = qb.build().unwrap();
    assert_eq!(built.sql, "SELECT * FROM users WHERE name ILIKE :p_1_name");
    assert_eq!(built.params.get("p_1_name"), Some(&Value::from("%ann%")));

    // Same builder on MySQL stays LIKE.
    let qb = Compiler::new(Dialect::MySql).select("users").where_like("name", "ann");
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM users WHERE name LIKE :p_1_name"
    );
}

#[test]
fn test_factory_builder_follows_dialect() {
    let qb = select("users").dialect(Dialect::Postgres).where_like("name", "ann");
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM users WHERE name ILIKE :p_1_name"
    );

    let qb = delete("users")
        .dialect(Dialect::Postgres)
        .where_not_like("name", "bot");
    assert_eq!(
        qb.to_sql().unwrap(),
        "DELETE FROM users WHERE name NOT ILIKE :p_1_name"
    );

    let qb = select("users")
        .compiler(Compiler::new(Dialect::Postgres).adapt_dialect(false))
        .where_like("name", "ann");
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM users WHERE name LIKE :p_1_name"
    );
}

#[test]
fn test_select_join_group_having() {
    let qb = select("users")
        .select_raw("users.id, COUNT(orders.id) AS order_count")
        .left_join("orders", "users.id", "orders.user_id")
        .where_eq("users.status", "active")
        .group_by(&["users.id"])
        .having(Condition::raw_with("COUNT(orders.id) > :min", [("min", 5)]))
        .order_by_desc("order_count")
        .limit(10);

    let sql = qb.to_sql().unwrap();

    assert!(sql.contains("SELECT users.id, COUNT(orders.id) AS order_count"));
    assert!(sql.contains("FROM users"));
    assert!(sql.contains("LEFT JOIN orders ON users.id = orders.user_id"));
    assert!(sql.contains("WHERE users.status = :p_1_users_status"));
    assert!(sql.contains("GROUP BY users.id"));
    assert!(sql.contains("HAVING COUNT(orders.id) > :min"));
    assert!(sql.contains("ORDER BY order_count DESC"));
    assert!(sql.contains("LIMIT 10"));
}

#[test]
fn test_update_with_complex_where() {
    let qb = update("products")
        .set("price", 99.99)
        .set_raw("updated_at", "NOW()")
        .where_eq("category", "electronics")
        .where_in("brand", ["Apple", "Samsung", "Google"])
        .where_op("stock", ">", 0)
        .dialect(Dialect::Postgres)
        .returning(&["id", "name", "price"]);

    let sql = qb.to_sql().unwrap();

    assert!(sql.contains("UPDATE products SET"));
    assert!(sql.contains("price = :set_1_price"));
    assert!(sql.contains("updated_at = NOW()"));
    assert!(sql.contains("category = :p_2_category"));
    assert!(sql.contains("brand IN (:in_3_brand, :in_4_brand, :in_5_brand)"));
    assert!(sql.contains("stock > :p_6_stock"));
    assert!(sql.contains("RETURNING id, name, price"));
}

#[test]
fn test_empty_in_list_semantics() {
    let qb = select("users").where_in("id", Vec::<i32>::new());
    assert!(qb.to_sql().unwrap().contains("1=0"));

    let qb = select("users").where_not_in("id", Vec::<i32>::new());
    assert!(qb.to_sql().unwrap().contains("1=1"));
}

#[test]
fn test_between() {
    let qb = select("products")
        .where_between("price", 10.0, 100.0)
        .where_cond(Condition::not_between("stock", 0, 5).unwrap());

    let sql = qb.to_sql().unwrap();
    assert!(sql.contains("price BETWEEN :bet_1_price AND :bet_2_price"));
    assert!(sql.contains("stock NOT BETWEEN :nbet_3_stock AND :nbet_4_stock"));
}

#[test]
fn test_rebuild_never_repeats_placeholders() {
    let mut qb = select("users").where_eq("id", 1);
    let first = qb.build().unwrap();
    let second = qb.build().unwrap();
    assert_eq!(first.sql, "SELECT * FROM users WHERE id = :p_1_id");
    assert_eq!(second.sql, "SELECT * FROM users WHERE id = :p_2_id");
}

#[test]
fn test_reset_keeps_counter() {
    let mut qb = select("users").where_eq("a", 1).limit(5);
    qb.build().unwrap();
    qb.reset();
    let mut qb = qb.where_eq("b", 2);
    let built = qb.build().unwrap();
    assert_eq!(built.sql, "SELECT * FROM users WHERE b = :p_2_b");

    qb.new_session();
    assert_eq!(qb.session().counter(), 0);
}

#[test]
fn test_first_error_wins() {
    let qb = select("users")
        .where_op("a", "~~", 1)
        .where_eq("bad col", 1);
    assert!(qb.to_sql().unwrap_err().is_unknown_operator());
}

#[test]
fn test_raw_param_collision() {
    let qb = select("users")
        .where_raw_with("a = :x", [("x", 1)])
        .where_raw_with("b = :x", [("x", 2)]);
    assert!(matches!(
        qb.to_sql(),
        Err(crate::error::BuildError::DuplicateParameter(_))
    ));
}

#[test]
fn test_insert_then_positional() {
    let mut qb = insert("users").set("username", "alice").set("age", 30);
    let built = qb.build().unwrap();

    let pg = built.to_positional(Dialect::Postgres).unwrap();
    assert_eq!(pg.sql, "INSERT INTO users (username, age) VALUES ($1, $2)");
    assert_eq!(pg.values, [Value::from("alice"), Value::Int(30)]);

    let my = built.to_positional(Dialect::MySql).unwrap();
    assert_eq!(my.sql, "INSERT INTO users (username, age) VALUES (?, ?)");
}

#[test]
fn test_delete_requires_where() {
    assert!(delete("users").to_sql().is_err());
    assert_eq!(
        delete("users").where_eq("id", 1).to_sql().unwrap(),
        "DELETE FROM users WHERE id = :p_1_id"
    );
}

#[test]
fn test_unique_check_factory() {
    let check = unique_check("users", "email", "a@b.c").except("id", 3);
    assert_eq!(
        check.to_sql().unwrap(),
        "SELECT COUNT(*) FROM users WHERE email = :p_1_email AND id != :p_2_id"
    );
}

#[test]
fn test_pagination() {
    let qb = select("users").order_by_desc("created_at").paginate(3, 25);

    let sql = qb.to_sql().unwrap();
    assert!(sql.contains("LIMIT 25"));
    assert!(sql.contains("OFFSET 50"));
}
