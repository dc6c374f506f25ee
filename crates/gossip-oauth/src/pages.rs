//! HTML pages: the authorization server's login form and the client's result page.
//!
//! Pure functions of their input. All interpolated values are HTML-escaped to prevent XSS.

/// Values behind the login form.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub callback_url: String,
    pub client_id: String,
}

/// Values behind the gossip result page.
#[derive(Debug, Clone)]
pub struct GossipPage {
    pub user: String,
    pub items: Vec<String>,
}

const STYLE: &str = r#"<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; display: flex; justify-content: center; align-items: center; min-height: 100vh; }
.card { background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; max-width: 400px; width: 100%; }
h1 { font-size: 20px; margin: 0 0 8px; color: #333; }
.subtitle { color: #666; font-size: 14px; margin: 0 0 24px; }
label { display: block; font-size: 14px; font-weight: 500; margin: 12px 0 6px; color: #333; }
input[type="text"], input[type="password"] { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; box-sizing: border-box; }
button { width: 100%; padding: 10px; background: #4a90d9; color: #fff; border: none; border-radius: 4px; font-size: 14px; font-weight: 500; cursor: pointer; margin-top: 16px; }
li { margin-bottom: 8px; }
</style>"#;

/// Render the authorization login + consent form.
///
/// Posts `username`, `password`, `client_id` and `callback_url` back to `/authorization`.
#[must_use]
pub fn render_login_page(form: &LoginForm) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Authorize - Gossip</title>
{STYLE}
</head>
<body>
<div class="card">
<h1>Authorization</h1>
<p class="subtitle"><strong>{client_id}</strong> wants to read your gossip</p>
<form method="POST" action="/authorization">
<input type="hidden" name="client_id" value="{client_id}">
<input type="hidden" name="callback_url" value="{callback_url}">
<label for="username">Username</label>
<input type="text" id="username" name="username" required autofocus>
<label for="password">Password</label>
<input type="password" id="password" name="password" required>
<button type="submit">Log in and authorize</button>
</form>
</div>
</body>
</html>"#,
        client_id = html_escape(&form.client_id),
        callback_url = html_escape(&form.callback_url),
    )
}

/// Render the gossip a user is allowed to read.
#[must_use]
pub fn render_gossip_page(page: &GossipPage) -> String {
    let items: String = page
        .items
        .iter()
        .map(|item| format!("<li>{}</li>\n", html_escape(item)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Gossip of {user}</title>
{STYLE}
</head>
<body>
<div class="card">
<h1>Gossip of {user}</h1>
<ul>
{items}</ul>
</div>
</body>
</html>"#,
        user = html_escape(&page.user),
    )
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
