//! Embedded static resources.

pub mod serve {
    /// Served path of the live-reload client.
    pub const HOTRELOAD_URL: &str = "/__kiln/hotreload.js";

    const HOTRELOAD_JS: &str = include_str!("serve/hotreload.js");
    const WS_PORT_VAR: &str = "__KILN_WS_PORT__";

    /// Live-reload client script, pointed at `ws_port`.
    pub fn hotreload_js(ws_port: u16) -> String {
        HOTRELOAD_JS.replace(WS_PORT_VAR, &ws_port.to_string())
    }

    /// `<script>` tag injected into served HTML.
    pub fn hotreload_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_URL}"></script>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_hotreload_port_substituted() {
        let js = hotreload_js(35730);
        assert!(js.contains("var PORT = 35730;"));
        assert!(!js.contains("__KILN_WS_PORT__"));
    }

    #[test]
    fn test_hotreload_tag() {
        assert_eq!(
            hotreload_tag(),
            r#"<script src="/__kiln/hotreload.js"></script>"#
        );
    }
}
