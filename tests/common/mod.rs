//! Shared helpers for integration tests.

#![allow(dead_code)]

use crawler::models::{Config, Credentials, EndpointConfig, ThrottleConfig};
use serde_json::{Value, json};

pub const RAPID_KEY: &str = "test-key";
pub const VK_TOKEN: &str = "test-token";

/// Config pointing every provider at the mock server, without delays.
pub fn config_for(base: &str) -> Config {
    Config {
        endpoints: EndpointConfig::all_at(base),
        throttle: ThrottleConfig::none(),
        ..Config::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        rapidapi_key: Some(RAPID_KEY.to_string()),
        vk_access_token: Some(VK_TOKEN.to_string()),
    }
}

/// Instagram `media_info` payload with one item.
pub fn instagram_media(code: &str, views: i64, likes: i64) -> Value {
    json!({
        "status": "ok",
        "message": "",
        "data": {"items": [instagram_item(code, views, likes)]}
    })
}

pub fn instagram_item(code: &str, views: i64, likes: i64) -> Value {
    json!({
        "code": code,
        "taken_at": 1704067200,
        "like_count": likes,
        "comment_count": 4,
        "reshare_count": 1,
        "ig_play_count": views,
        "caption": {"text": format!("caption {code}")}
    })
}

/// Header row at row 2 and data rows from row 3, as users lay out input sheets.
pub fn input_sheet(noun: &str, urls: &[(&str, bool, i64)]) -> Vec<Vec<Value>> {
    let mut rows = vec![
        vec![json!("Отчёт")],
        vec![
            json!(format!("Ссылка на {noun}")),
            json!("Парсинг"),
            json!("Глубина"),
        ],
    ];
    for (url, selected, depth) in urls {
        rows.push(vec![json!(url), json!(selected), json!(depth)]);
    }
    rows
}
