#![allow(dead_code)]

use axum::body::{Body, to_bytes};
use axum::http::Request;
use bookstore::db::Book;
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn book(isbn: &str, title: &str, author: &str, price: &str) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        price: Decimal::from_str(price).expect("price"),
    }
}

pub fn sample_books() -> Vec<Book> {
    vec![
        book("978-1503261969", "Emma", "Jayne Austen", "9.44"),
        book("978-1505255607", "The Time Machine", "H. G. Wells", "5.99"),
    ]
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .expect("request")
}

pub async fn read_body(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
