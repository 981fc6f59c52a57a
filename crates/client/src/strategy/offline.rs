//! Synthesized responses for requests that neither network nor cache can answer.

use smarttask_core::Response;

pub const UNAVAILABLE_BODY: &str = "Offline - Content not available";

/// `503 Service Unavailable` placeholder for sub-resources.
pub fn unavailable() -> Response {
    Response::new(503, "Service Unavailable", UNAVAILABLE_BODY)
}

/// Full HTML page for navigations, with a reload control.
pub fn offline_page(app_name: &str) -> Response {
    Response::ok(render_page(app_name)).with_header("Content-Type", "text/html")
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_page(app_name: &str) -> String {
    let name = escape_html(app_name);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>{name} - Offline</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      body {{
        font-family: system-ui, sans-serif;
        text-align: center;
        padding: 2rem;
        background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        color: white;
        min-height: 100vh;
        display: flex;
        align-items: center;
        justify-content: center;
        margin: 0;
      }}
      .container {{
        background: rgba(255, 255, 255, 0.1);
        padding: 2rem;
        border-radius: 1rem;
      }}
      button {{
        margin-top: 1rem;
        padding: 0.5rem 1rem;
        background: rgba(255, 255, 255, 0.2);
        border: 1px solid rgba(255, 255, 255, 0.3);
        color: white;
        border-radius: 0.5rem;
        cursor: pointer;
      }}
    </style>
  </head>
  <body>
    <div class="container">
      <h1>{name}</h1>
      <h2>You're Offline</h2>
      <p>Please check your internet connection and try again.</p>
      <button onclick="window.location.reload()">Try Again</button>
    </div>
  </body>
</html>
"#
    )
}
