//! Terminal stand-ins for the tracking-service dialogs.
//!
//! The client binary has no GUI toolkit: dialogs announce themselves on the
//! terminal and the publish dialog reports progress and messages there.
//! Windows are done once announced. A publish dialog stays open until its
//! publish ends; when the form was given on the command line it is
//! submitted as soon as it opens.

use colored::Colorize;
use fcu_core::Result;
use fcu_core::context::LaunchContext;
use fcu_core::dialog::{DialogFactory, DialogKind, DialogWindow, PublishView};
use fcu_core::publish::PublishForm;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub struct ConsoleWindow {
    kind: DialogKind,
    closed: AtomicBool,
}

impl DialogWindow for ConsoleWindow {
    fn kind(&self) -> DialogKind {
        self.kind
    }

    fn show(&self) {
        println!("{} {}", "▶".cyan(), self.kind.window_title().bold());
        self.closed.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        println!("{} {} closed", "■".dimmed(), self.kind.window_title());
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Publish form fields given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PublishPreset {
    pub asset_name: String,
    pub asset_type: String,
    pub status: String,
    pub comment: String,
}

pub struct ConsolePublishView {
    form: Mutex<PublishForm>,
    submit: bool,
    closed: AtomicBool,
}

impl ConsolePublishView {
    pub fn new(context: &LaunchContext, preset: Option<&PublishPreset>) -> Self {
        let mut form = PublishForm {
            task_id: context.task_id.clone(),
            shot_id: context.shot_id.clone(),
            ..Default::default()
        };
        if let Some(preset) = preset {
            form.asset_name = preset.asset_name.clone();
            form.asset_type = preset.asset_type.clone();
            form.status = preset.status.clone();
            form.comment = preset.comment.clone();
        }
        Self {
            form: Mutex::new(form),
            submit: preset.is_some(),
            closed: AtomicBool::new(false),
        }
    }

    fn with_form<T>(&self, f: impl FnOnce(&mut PublishForm) -> T) -> T {
        let mut form = match self.form.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut form)
    }
}

impl PublishView for ConsolePublishView {
    fn show(&self) {
        println!("{} {}", "▶".cyan(), DialogKind::Publish.window_title().bold());
    }

    fn close(&self) {
        println!("{} Publish closed", "■".dimmed());
        self.closed.store(true, Ordering::SeqCst);
    }

    fn form(&self) -> PublishForm {
        self.with_form(|form| form.clone())
    }

    fn set_progress(&self, percent: u8) {
        println!("  publish {:>3}%", percent);
        if percent >= 100 {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn show_warning(&self, subject: &str, message: &str) {
        println!("{} {}: {}", "⚠".yellow(), subject.yellow(), message);
    }

    fn show_error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }

    fn show_info(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    fn reset_options(&self) {
        self.with_form(|form| {
            form.options.clear();
            form.comment.clear();
        });
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn submits_on_show(&self) -> bool {
        self.submit
    }
}

pub struct ConsoleDialogFactory {
    context: LaunchContext,
    preset: Option<PublishPreset>,
}

impl ConsoleDialogFactory {
    pub fn new(context: LaunchContext, preset: Option<PublishPreset>) -> Self {
        Self { context, preset }
    }
}

impl DialogFactory for ConsoleDialogFactory {
    fn open(&self, kind: DialogKind) -> Result<Arc<dyn DialogWindow>> {
        Ok(Arc::new(ConsoleWindow {
            kind,
            closed: AtomicBool::new(false),
        }))
    }

    fn open_publish(&self) -> Result<Arc<dyn PublishView>> {
        Ok(Arc::new(ConsolePublishView::new(
            &self.context,
            self.preset.as_ref(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_form_prefilled_and_reset() {
        let context = LaunchContext {
            task_id: Some("task-1".to_string()),
            shot_id: Some("shot-1".to_string()),
            ..Default::default()
        };
        let view = ConsolePublishView::new(&context, None);
        assert!(!view.submits_on_show());
        view.with_form(|form| {
            form.comment = "first pass".to_string();
            form.options.insert("reviewable".to_string(), json!(true));
        });

        let form = view.form();
        assert_eq!(form.task_id.as_deref(), Some("task-1"));
        assert_eq!(form.comment, "first pass");

        view.reset_options();
        let form = view.form();
        assert!(form.options.is_empty());
        assert!(form.comment.is_empty());
        assert_eq!(form.shot_id.as_deref(), Some("shot-1"));
    }

    #[test]
    fn test_preset_form_submits_and_closes_when_done() {
        let preset = PublishPreset {
            asset_name: "chair".to_string(),
            asset_type: "geo".to_string(),
            status: "Pending Review".to_string(),
            comment: String::new(),
        };
        let view = ConsolePublishView::new(&LaunchContext::default(), Some(&preset));

        assert!(view.submits_on_show());
        assert_eq!(view.form().asset_name, "chair");
        assert_eq!(view.form().status, "Pending Review");

        view.set_progress(25);
        assert!(!view.is_closed());
        view.set_progress(100);
        assert!(view.is_closed());
    }

    #[test]
    fn test_window_is_done_once_announced() {
        let factory = ConsoleDialogFactory::new(LaunchContext::default(), None);
        let window = factory.open(DialogKind::Info).unwrap();

        assert!(!window.is_closed());
        window.show();
        assert!(window.is_closed());
    }
}
