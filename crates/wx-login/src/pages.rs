//! Embedded HTML pages served by the login form server

/// Login form
pub const LOGIN_FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>wx-gateway - windy.com login</title>
    <style>
        body { font-family: -apple-system, sans-serif; background: #1a2a3a; color: #eee;
               display: flex; justify-content: center; align-items: center; min-height: 100vh; }
        form { background: #223548; padding: 2rem; border-radius: 8px; width: 320px; }
        h1 { font-size: 1.2rem; margin-top: 0; }
        label { display: block; margin-top: 1rem; font-size: 0.9rem; }
        input { width: 100%; padding: 0.5rem; margin-top: 0.25rem; border: none;
                border-radius: 4px; box-sizing: border-box; }
        button { margin-top: 1.5rem; width: 100%; padding: 0.6rem; border: none;
                 border-radius: 4px; background: #d03030; color: #fff; font-size: 1rem; }
        p { font-size: 0.8rem; color: #9ab; }
    </style>
</head>
<body>
    <form method="post" action="/login">
        <h1>windy.com login</h1>
        <p>Credentials are forwarded to windy.com and never stored; only the
           session cookies are kept in memory for authenticated forecasts.</p>
        <label>Email
            <input type="email" name="email" required autofocus>
        </label>
        <label>Password
            <input type="password" name="password" required>
        </label>
        <button type="submit">Log in</button>
    </form>
</body>
</html>
"#;

/// Shown after session cookies were captured
pub const LOGIN_SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>wx-gateway - logged in</title>
</head>
<body style="font-family: sans-serif; background: #1a2a3a; color: #eee; text-align: center; padding-top: 4rem;">
    <h1>Logged in</h1>
    <p>The bot will now use your windy.com session for forecasts. You can close this page.</p>
</body>
</html>
"#;

/// Shown when windy.com rejected the credentials
pub const LOGIN_FAILURE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>wx-gateway - login failed</title>
</head>
<body style="font-family: sans-serif; background: #1a2a3a; color: #eee; text-align: center; padding-top: 4rem;">
    <h1>Login failed</h1>
    <p>windy.com did not accept the credentials. <a href="/login" style="color: #9cf;">Try again</a>.</p>
</body>
</html>
"#;
