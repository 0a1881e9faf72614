//! Compiles [`Locator`]s into XPath and the page scripts that probe them.
//!
//! Every locator kind is lowered to XPath so the live session has a single
//! lookup path (`document.evaluate` for probes, `find_xpath` for handles).

use scout_core::Locator;
use serde::Deserialize;

/// XPath expression selecting the elements a locator describes.
#[must_use]
pub fn to_xpath(locator: &Locator) -> String {
    match locator {
        Locator::Id(id) => format!("//*[@id={}]", xpath_literal(id)),
        Locator::Class(class) => format!(
            "//*[contains(concat(' ', normalize-space(@class), ' '), {})]",
            xpath_literal(&format!(" {} ", class.trim()))
        ),
        Locator::XPath(xpath) => xpath.clone(),
    }
}

/// Quote a string for use inside an XPath 1.0 expression.
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{value}\"")
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{part}\""))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

/// Wrap `body` in a script that binds the first match of `locator` to `node`
/// (or `null`).
fn with_node(locator: &Locator, body: &str) -> String {
    // JSON string literals are valid JS string literals
    let xpath = serde_json::Value::String(to_xpath(locator)).to_string();
    format!(
        "(() => {{ const node = document.evaluate({xpath}, document, null, \
         XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; {body} }})()"
    )
}

/// Script evaluating to `true` when the element is in the DOM.
pub(crate) fn presence_script(locator: &Locator) -> String {
    with_node(locator, "return node !== null;")
}

/// Script evaluating to `true` when the element is in the DOM and rendered.
pub(crate) fn visibility_script(locator: &Locator) -> String {
    with_node(
        locator,
        "if (node === null) return false; \
         const style = window.getComputedStyle(node); \
         return style.display !== 'none' && style.visibility !== 'hidden' \
             && node.getClientRects().length > 0;",
    )
}

/// Script evaluating to a JSON-encoded [`Probe`] of the element's text.
pub(crate) fn text_script(locator: &Locator) -> String {
    with_node(
        locator,
        "return JSON.stringify(node === null ? { found: false } \
             : { found: true, value: node.innerText ?? node.textContent ?? '' });",
    )
}

/// Script evaluating to a JSON-encoded [`Probe`] of an attribute.
///
/// DOM properties win over raw attributes so `src`/`href` come back as
/// absolute URLs.
pub(crate) fn attribute_script(locator: &Locator, name: &str) -> String {
    let name = serde_json::Value::String(name.to_string()).to_string();
    with_node(
        locator,
        &format!(
            "if (node === null) return JSON.stringify({{ found: false }}); \
             let value = node[{name}]; \
             if (typeof value !== 'string') value = node.getAttribute({name}); \
             return JSON.stringify({{ found: true, value: value }});"
        ),
    )
}

/// Result of a text or attribute probe.
#[derive(Debug, Deserialize)]
pub(crate) struct Probe {
    pub found: bool,
    #[serde(default)]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_to_xpath() {
        assert_eq!(
            to_xpath(&Locator::id("searchText")),
            r#"//*[@id="searchText"]"#
        );
    }

    #[test]
    fn test_class_to_xpath() {
        assert_eq!(
            to_xpath(&Locator::class("submit")),
            r#"//*[contains(concat(' ', normalize-space(@class), ' '), " submit ")]"#
        );
    }

    #[test]
    fn test_xpath_passthrough() {
        let xpath = r#"//*[@id="tbody"]/tr/td[5]/span[2]"#;
        assert_eq!(to_xpath(&Locator::xpath(xpath)), xpath);
    }

    #[test]
    fn test_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "\"plain\"");
        assert_eq!(xpath_literal(r#"say "hi""#), r#"'say "hi"'"#);
        assert_eq!(
            xpath_literal(r#"it's "x""#),
            r#"concat("it's ", '"', "x", '"', "")"#
        );
    }

    #[test]
    fn test_scripts_embed_escaped_xpath() {
        let script = presence_script(&Locator::xpath(r#"//*[@id="srchBtn"]"#));
        assert!(script.contains(r#""//*[@id=\"srchBtn\"]""#));
        assert!(script.contains("return node !== null;"));
    }

    #[test]
    fn test_probe_parsing() {
        let probe: Probe = serde_json::from_str(r#"{"found":true,"value":"x"}"#).unwrap();
        assert!(probe.found);
        assert_eq!(probe.value.as_deref(), Some("x"));

        let probe: Probe = serde_json::from_str(r#"{"found":false}"#).unwrap();
        assert!(!probe.found);
        assert!(probe.value.is_none());

        let probe: Probe = serde_json::from_str(r#"{"found":true,"value":null}"#).unwrap();
        assert!(probe.value.is_none());
    }
}
