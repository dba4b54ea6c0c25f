//! Server-rendered pages. Plain format strings; no template engine.

use sso::{SessionToken, UserProfile};

use crate::delivery::TOKEN_COOKIE;

fn page(title: &str, body: &str, script: Option<&str>) -> String {
    let script = script
        .map(|s| format!("<script>{s}</script>"))
        .unwrap_or_default();
    format!(
        "<!doctype html>\
         <html>\
           <head>\
             <meta charset=\"utf-8\">\
             <title>{title}</title>\
             <style>\
               body {{ font-family: sans-serif; margin: 3rem; color: #1f2933; }}\
               pre {{ background: #f5f7fa; padding: 1rem; }}\
             </style>\
           </head>\
           <body>{body}{script}</body>\
         </html>"
    )
}

pub fn home_page(profile: &UserProfile) -> String {
    let greeting = profile
        .get("name")
        .and_then(|v| v.as_str())
        .map(|name| format!("Welcome, {}", escape_html(name)))
        .unwrap_or_else(|| "Welcome".to_string());
    let pretty = serde_json::to_string_pretty(profile).unwrap_or_default();

    page(
        "Home",
        &format!(
            "<h1>{greeting}</h1>\
             <pre id=\"profile\">{}</pre>\
             <p><a href=\"/logout\">Log out</a></p>",
            escape_html(&pretty)
        ),
        None,
    )
}

/// Home page for browser-held tokens: the script loads the profile itself.
pub fn client_home_page() -> String {
    let script = format!(
        "(function () {{\
           var token = window.localStorage.getItem('{TOKEN_COOKIE}');\
           if (!token) {{ window.location.replace('/login'); return; }}\
           fetch('/api/profile', {{ headers: {{ 'Authorization': 'Bearer ' + token }} }})\
             .then(function (res) {{\
               if (!res.ok) {{ throw new Error('profile request failed: ' + res.status); }}\
               return res.json();\
             }})\
             .then(function (profile) {{\
               var heading = document.getElementById('greeting');\
               if (typeof profile.name === 'string') {{ heading.textContent = 'Welcome, ' + profile.name; }}\
               document.getElementById('profile').textContent = JSON.stringify(profile, null, 2);\
             }})\
             .catch(function () {{\
               window.localStorage.removeItem('{TOKEN_COOKIE}');\
               window.location.replace('/login');\
             }});\
         }})();"
    );

    page(
        "Home",
        "<h1 id=\"greeting\">Loading...</h1>\
         <pre id=\"profile\"></pre>\
         <p><a href=\"/logout\">Log out</a></p>",
        Some(&script),
    )
}

pub fn store_token_page(token: &SessionToken) -> String {
    let script = format!(
        "window.localStorage.setItem('{TOKEN_COOKIE}', {});\
         window.location.replace('/');",
        script_string(token.as_str())
    );
    page("Signing in", "<p>Signing in...</p>", Some(&script))
}

pub fn clear_token_page() -> String {
    let script = format!(
        "window.localStorage.removeItem('{TOKEN_COOKIE}');\
         window.location.replace('/login');"
    );
    page("Signing out", "<p>Signing out...</p>", Some(&script))
}

/// JSON string literal that is safe to place inside a `<script>` element.
fn script_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in serde_json::Value::from(value).to_string().chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
