#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-patientor-ui]";

/// Default CSS for the app along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --patientor-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --patientor-bg: #ffffff;
  --patientor-text: #1f2933;
  --patientor-muted: #52606d;
  --patientor-heading: #11181c;
  --patientor-border: rgba(148, 163, 184, 0.38);
  --patientor-card-border: #1f2933;
  --patientor-radius: 8px;
  --patientor-accent: #2563eb;
  --patientor-error: #b42318;
  --patientor-kind-health-check: #067647;
  --patientor-kind-hospital: #b54708;
  --patientor-kind-occupational: #0b5394;
}

.patientor-root {
  font-family: var(--patientor-font-family);
  background: var(--patientor-bg);
  color: var(--patientor-text);
  max-width: 760px;
  margin: 0 auto;
  padding: 16px;
}

.patientor-header {
  display: flex;
  align-items: baseline;
  gap: 16px;
  border-bottom: 1px solid var(--patientor-border);
  margin-bottom: 16px;
}

.patientor-header h1 {
  color: var(--patientor-heading);
  margin: 0 0 8px;
}

.patientor-home {
  color: var(--patientor-accent);
  text-decoration: none;
}

.patientor-error {
  color: var(--patientor-error);
}

.patient-list table {
  width: 100%;
  border-collapse: collapse;
  margin-bottom: 24px;
}

.patient-list th {
  text-align: left;
  border-bottom: 1px solid var(--patientor-border);
  padding: 6px 8px;
}

.patient-list td {
  padding: 6px 8px;
}

.patient-list td a {
  color: var(--patientor-accent);
  text-decoration: none;
}

.patient-identity {
  display: flex;
  align-items: center;
  gap: 12px;
}

.patient-gender {
  font-size: 1.4rem;
  color: var(--patientor-muted);
}

.patient-facts p {
  margin: 2px 0;
}

.patientor-form {
  border: 1px dashed var(--patientor-border);
  border-radius: var(--patientor-radius);
  padding: 12px 16px;
  margin: 16px 0;
  display: flex;
  flex-direction: column;
  gap: 8px;
}

.patientor-field {
  display: flex;
  flex-direction: column;
  gap: 2px;
}

.patientor-field span {
  font-size: 0.85rem;
  color: var(--patientor-muted);
}

.patientor-field input,
.patientor-field select {
  padding: 5px 8px;
  border: 1px solid var(--patientor-border);
  border-radius: 4px;
  font: inherit;
}

.patientor-nested {
  border: 1px solid var(--patientor-border);
  border-radius: 4px;
  display: flex;
  flex-direction: column;
  gap: 8px;
}

.patientor-nested legend {
  color: var(--patientor-muted);
  font-size: 0.85rem;
  padding: 0 4px;
}

.patientor-actions {
  display: flex;
  justify-content: space-between;
  margin-top: 8px;
}

.patientor-actions button {
  font: inherit;
  padding: 6px 16px;
  border: none;
  border-radius: 4px;
  background: var(--patientor-accent);
  color: #ffffff;
  cursor: pointer;
}

.patientor-actions button.is-cancel {
  background: var(--patientor-error);
}

/* Form thêm bệnh nhân chỉ có nút ADD nên canh về bên phải. */
.patientor-actions button:only-child {
  margin-left: auto;
}

.entry-kind-buttons {
  display: flex;
  gap: 8px;
  margin: 16px 0;
}

.entry-kind-buttons button {
  font: inherit;
  padding: 6px 12px;
  border: 1px solid var(--patientor-border);
  border-radius: 4px;
  background: transparent;
  cursor: pointer;
}

.entry-form-frame {
  margin: 16px 0;
}

.entry-card {
  border: 1px solid var(--patientor-card-border);
  border-radius: var(--patientor-radius);
  padding: 10px 14px;
  margin-bottom: 10px;
}

.entry-meta {
  display: flex;
  gap: 10px;
  align-items: baseline;
}

.entry-date {
  font-weight: 600;
}

.entry-kind {
  font-size: 0.8rem;
  text-transform: uppercase;
  letter-spacing: 0.04em;
  color: var(--patientor-muted);
}

.entry-card[data-kind="health-check"] .entry-kind {
  color: var(--patientor-kind-health-check);
}

.entry-card[data-kind="hospital"] .entry-kind {
  color: var(--patientor-kind-hospital);
}

.entry-card[data-kind="occupational"] .entry-kind {
  color: var(--patientor-kind-occupational);
}

.entry-description {
  font-style: italic;
  margin: 6px 0;
}

.entry-employer {
  margin: 4px 0 0;
  color: var(--patientor-muted);
}

.entry-diagnoses {
  margin: 4px 0;
  padding-left: 24px;
}

.entry-code {
  font-weight: 600;
}

.entry-specialist {
  margin: 6px 0 0;
  color: var(--patientor-muted);
}

@media (max-width: 560px) {
  .patient-list table {
    font-size: 0.9rem;
  }

  .entry-kind-buttons {
    flex-direction: column;
    align-items: stretch;
  }

  .entry-kind-buttons button {
    width: 100%;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-patientor-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
