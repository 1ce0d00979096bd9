//! HTML pages shown in the operator's browser after the login redirect.

const HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Kite MCP Authentication</title>
    <style>
        body {
            font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif;
            background-color: #f5f5f5;
            margin: 0;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
        }
        .card {
            background-color: white;
            border-radius: 10px;
            box-shadow: 0 4px 8px rgba(0, 0, 0, 0.1);
            padding: 30px;
            text-align: center;
            max-width: 500px;
            width: 100%;
        }
        .success { color: #28a745; }
        .error { color: #dc3545; }
        p { color: #6c757d; line-height: 1.6; }
    </style>
</head>
<body>
"#;

const FOOTER: &str = "</body>\n</html>\n";

const SUCCESS_BODY: &str = r#"    <div class="card">
        <h1 class="success">Authentication Successful</h1>
        <p>Your Kite account is now connected to the MCP server.</p>
        <p>You can close this window and return to your assistant.</p>
    </div>
"#;

const FAILURE_BODY: &str = r#"    <div class="card">
        <h1 class="error">Authentication Failed</h1>
        <p>The redirect did not carry a request token.</p>
        <p>Start the login again from the URL printed by the server.</p>
    </div>
"#;

fn render(body: &str) -> String {
    format!("{HEADER}{body}{FOOTER}")
}

pub fn success_page() -> String {
    render(SUCCESS_BODY)
}

pub fn failure_page() -> String {
    render(FAILURE_BODY)
}
