//! JavaScript snippets evaluated by the CDP driver
//!
//! Found elements are kept in a page-side registry keyed by a string id, so
//! later calls address the exact node that was found. A node that has left
//! the document reports `{stale: true}` instead of running the operation.

use super::locator::By;

/// Page-side registry expression, created on first use
const REGISTRY: &str =
    "(window.__perspectiveAutomation = window.__perspectiveAutomation || { nodes: {}, next: 1 })";

/// Drops registered nodes that have left the document
const PRUNE: &str = "for (const k in r.nodes) { if (!r.nodes[k].isConnected) delete r.nodes[k]; }";

/// Encode a string as a JavaScript literal
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Expression producing an array of matches below `scope`
fn query(by: &By) -> String {
    let value = js_string(by.value());
    match by {
        By::Id(_) => format!("Array.from(scope.querySelectorAll('#' + CSS.escape({})))", value),
        By::ClassName(_) => format!("Array.from(scope.getElementsByClassName({}))", value),
        By::TagName(_) => format!("Array.from(scope.getElementsByTagName({}))", value),
        By::Css(_) => format!("Array.from(scope.querySelectorAll({}))", value),
        By::XPath(_) => format!(
            "(() => {{ const s = document.evaluate({}, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
             const out = []; for (let i = 0; i < s.snapshotLength; i++) out.push(s.snapshotItem(i)); return out; }})()",
            value
        ),
    }
}

/// Find elements below a registered element, or below the document
///
/// Evaluates to `{stale, ids}`.
pub fn find_script(scope_id: Option<&str>, by: &By) -> String {
    let scope = match scope_id {
        Some(id) => format!("r.nodes[{}]", js_string(id)),
        None => "document".to_string(),
    };
    format!(
        "(() => {{ const r = {registry}; const scope = {scope}; {prune} \
         if (!scope || (scope !== document && !scope.isConnected)) return {{ stale: true, ids: [] }}; \
         const found = {query}; \
         const ids = found.map(el => {{ if (!el.__perspectiveId) {{ el.__perspectiveId = String(r.next++); }} \
         r.nodes[el.__perspectiveId] = el; return el.__perspectiveId; }}); \
         return {{ stale: false, ids }}; }})()",
        registry = REGISTRY,
        prune = PRUNE,
        scope = scope,
        query = query(by),
    )
}

/// Run `body` with `el` bound to a registered element
///
/// Evaluates to `{stale, value}` where `value` is whatever `body` returns.
pub fn element_script(id: &str, body: &str) -> String {
    format!(
        "(() => {{ const r = {registry}; const el = r.nodes[{id}]; \
         if (!el || !el.isConnected) {{ delete r.nodes[{id}]; return {{ stale: true }}; }} \
         return {{ stale: false, value: (() => {{ {body} }})() }}; }})()",
        registry = REGISTRY,
        id = js_string(id),
        body = body,
    )
}

pub const TAG_NAME: &str = "return el.tagName.toLowerCase();";

pub const TEXT: &str = "return el.innerText;";

pub const IS_ENABLED: &str = "return !el.disabled;";

pub const IS_DISPLAYED: &str = "const s = getComputedStyle(el); const b = el.getBoundingClientRect(); \
     return s.display !== 'none' && s.visibility !== 'hidden' && (b.width > 0 || b.height > 0);";

/// Scrolls the element into view and reports its centre
pub const CENTER: &str = "el.scrollIntoView({ block: 'center', inline: 'center' }); \
     const b = el.getBoundingClientRect(); \
     return { x: b.left + b.width / 2, y: b.top + b.height / 2, visible: b.width > 0 && b.height > 0 };";

/// Submits the owning form when there is one, otherwise focuses the element
pub const SUBMIT_FORM: &str = "if (el.form) { if (el.form.requestSubmit) { el.form.requestSubmit(); } else { el.form.submit(); } return true; } \
     el.focus(); return false;";

pub const OPTIONS: &str = "return Array.from(el.options || []).map(o => o.text.trim());";

/// Property first, then attribute; booleans map to `"true"` or null
pub fn attribute(name: &str) -> String {
    format!(
        "const n = {}; if (n === 'class') return el.getAttribute('class'); \
         if (n in el) {{ const v = el[n]; if (typeof v === 'boolean') return v ? 'true' : null; \
         if (v !== null && typeof v !== 'object' && typeof v !== 'function') return String(v); }} \
         return el.getAttribute(n);",
        js_string(name)
    )
}

pub fn select_by_visible_text(text: &str) -> String {
    format!(
        "const o = Array.from(el.options || []).find(o => o.text.trim() === {}); if (!o) return false; \
         el.value = o.value; o.selected = true; \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;",
        js_string(text)
    )
}
