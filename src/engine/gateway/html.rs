// Gateway — Status Page
// build_status_html

/// Small operator-facing fragment showing whether WhatsApp is connected.
pub(crate) fn build_status_html(ready: bool) -> String {
    let (color, label) = if ready {
        ("green", "ONLINE")
    } else {
        ("red", "OFFLINE / LOADING")
    };
    format!(
        r#"
        <div style="text-align:center; padding:50px; font-family: sans-serif;">
            <h1>SSI WhatsApp Server</h1>
            <h2 style="color: {color}">
                Status: {label}
            </h2>
        </div>
    "#
    )
}
