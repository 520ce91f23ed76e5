//! Shared SQLite fixture: two users, one hundred articles.
//!
//! Articles alternate between John (odd ids) and Jane (even ids).

#![allow(dead_code)]

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const ARTICLES_FROM: &str = "articles JOIN users AS user ON user.id = articles.user_id";

pub const ARTICLE_COLUMNS: [&str; 5] = [
    "articles.id AS id",
    "articles.title AS title",
    "articles.content AS content",
    "user.name AS user_name",
    "user.average_point AS user_average_point",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_name: String,
    pub user_average_point: String,
}

pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA case_sensitive_like=ON;
         CREATE TABLE users (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             average_point TEXT NOT NULL
         );
         CREATE TABLE articles (
             id INTEGER PRIMARY KEY,
             title TEXT NOT NULL,
             content TEXT NOT NULL,
             user_id INTEGER NOT NULL REFERENCES users(id)
         );
         INSERT INTO users (id, name, average_point) VALUES
             (1, 'John doe', 'Seventy %'),
             (2, 'Jane doe', 'one hundred %');",
    )
    .unwrap();

    let tx = conn.unchecked_transaction().unwrap();
    for i in 0..50 {
        tx.execute(
            "INSERT INTO articles (title, content, user_id) VALUES (?1, ?2, 1)",
            rusqlite::params![format!("Written by john {}", i), format!("Example by john {}", i)],
        )
        .unwrap();
        tx.execute(
            "INSERT INTO articles (title, content, user_id) VALUES (?1, ?2, 2)",
            rusqlite::params![format!("Written by jane {}", i), format!("Example by jane {}", i)],
        )
        .unwrap();
    }
    tx.commit().unwrap();

    conn
}

/// Percent-encode a query string value
pub fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect()
}

pub fn query_string(page: i64, size: i64, sort: &str, filters: &str) -> String {
    format!(
        "page={}&size={}&sort={}&filters={}",
        page,
        size,
        encode(sort),
        encode(filters)
    )
}
