use crate::dom;
use gloo_timers::callback::Timeout;
use idf_api_types::{Notification, Severity};
use web_sys::Element;

const TOAST_MS: u32 = 5_000;

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "toast-info",
        Severity::Success => "toast-success",
        Severity::Destructive => "toast-destructive",
    }
}

/// Appends a toast to `container` and removes it after a few seconds.
pub fn show(container: &Element, notification: &Notification) {
    let Some(toast) = dom::create_element("div") else {
        return;
    };
    dom::add_class(&toast, "toast");
    dom::add_class(&toast, severity_class(notification.severity));

    if let (Some(title), Some(body)) = (dom::create_element("strong"), dom::create_element("p")) {
        dom::set_text(&title, &notification.title);
        dom::set_text(&body, &notification.description);
        let _ = toast.append_child(&title);
        let _ = toast.append_child(&body);
    }
    if container.append_child(&toast).is_err() {
        return;
    }

    match notification.severity {
        Severity::Destructive => {
            tracing::warn!(title = %notification.title, "{}", notification.description)
        }
        _ => tracing::info!(title = %notification.title, "{}", notification.description),
    }

    Timeout::new(TOAST_MS, move || toast.remove()).forget();
}
