//! The form saver: protects one form.
//!
//! A [`FormSaver`] is a small state machine:
//!
//! ```text
//! Uninitialized ──protect()──▶ Protecting ──▶ Protected ◀──save──┐
//!       │                                        │               │
//!       └──(storage unavailable)──▶ Disabled     └──release──▶ Released
//!
//! any state ──unprotect()──▶ Disposed
//! ```
//!
//! Releasing clears storage but keeps every binding, so the next edit moves
//! the saver back to `Protected`. Only [`FormSaver::unprotect`] stops the
//! periodic timer and drops the bindings.

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use log::{debug, trace};

use crate::engine::codec::StoredValue;
use crate::engine::config::{ProtectConfig, ProtectOptions};
use crate::engine::errors::FormStateError;
use crate::engine::form::{Control, ControlId, ControlType, FieldKind, FormDocument, FormEvent, ProtectedField};
use crate::engine::key::{KeyScope, PageLocation};
use crate::engine::storage::StorageAdapter;
use crate::engine::tick::{RepeatingTimer, TickResult};

/// Current state of a form saver.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    /// Created but `protect()` has not run yet.
    #[default]
    Uninitialized,
    /// The restore pass of `protect()` is running.
    Protecting,
    /// Triggers are bound, values are saved as the user edits.
    Protected,
    /// Storage was cleared by a release pass. Bindings are still active.
    Released,
    /// Storage was unavailable at `protect()` time. Nothing is bound.
    Disabled,
    /// `unprotect()` was called. Terminal.
    Disposed,
}

/// Event subscriptions made by the saver, fixed at bind time.
#[derive(Debug, Default)]
struct Bindings {
    input: BTreeSet<ControlId>,     // per-keystroke save
    change: BTreeSet<ControlId>,    // save-all on committed change
    release: bool,                  // release on submit/reset
}

pub struct FormSaver {
    /// Options and lifecycle hooks
    config: ProtectConfig,
    /// Where values go
    storage: StorageAdapter,
    /// Page location captured at `protect()` time
    location: Option<PageLocation>,
    state: ProtectionState,
    /// Save triggers have been bound (happens once per saver)
    started: bool,
    bindings: Bindings,
    timer: Option<RepeatingTimer>,
}

impl std::fmt::Debug for FormSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSaver")
            .field("options", &self.config.options)
            .field("state", &self.state)
            .field("started", &self.started)
            .field("bindings", &self.bindings)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl FormSaver {
    pub fn new(storage: StorageAdapter, config: ProtectConfig) -> Self {
        Self {
            config,
            storage,
            location: None,
            state: ProtectionState::Uninitialized,
            started: false,
            bindings: Bindings::default(),
            timer: None,
        }
    }

    pub fn state(&self) -> ProtectionState {
        self.state
    }

    pub fn options(&self) -> &ProtectOptions {
        &self.config.options
    }

    /// Have the save triggers been bound?
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Would `dispatch` act on this event?
    pub fn is_bound(&self, event: &FormEvent) -> bool {
        match event {
            FormEvent::Input(id) => self.bindings.input.contains(id),
            FormEvent::Change(id) => self.bindings.change.contains(id),
            FormEvent::Submit | FormEvent::Reset => self.bindings.release,
        }
    }

    /// Storage key of the field `field_name` of `form`, as of now.
    pub fn storage_key(&self, form: &dyn FormDocument, field_name: &str) -> String {
        self.key_scope(form).key_for(field_name)
    }

    /// Starts (or resumes) protecting `form`.
    ///
    /// Restores stored values unless `on_before_restore` vetoes it, binds
    /// release to submit/reset when `auto_release` is set and, on the first
    /// call only, binds the save triggers.
    pub fn protect(&mut self, form: &mut dyn FormDocument) -> Result<(), FormStateError> {
        if self.state == ProtectionState::Disposed {
            return Err(FormStateError::Disposed);
        }

        self.location = form.location().map(|url| PageLocation::from_url(&url));

        if !self.storage.is_available() {
            debug!("storage unavailable, form {:?} is not protected", form.form_id());
            self.drop_bindings();
            self.state = ProtectionState::Disabled;
            return Err(FormStateError::StorageUnavailable);
        }

        self.state = ProtectionState::Protecting;
        if self.config.callbacks.before_restore() {
            self.restore_all(form);
        } else {
            debug!("restore skipped by on_before_restore");
        }

        if self.config.options.auto_release {
            self.bindings.release = true;
        }

        if !self.started {
            self.bind_save(form, Instant::now());
            self.started = true;
        }

        self.state = ProtectionState::Protected;
        Ok(())
    }

    /// Stops protecting the form: cancels the periodic save and drops every binding.
    /// Stored values are left alone.
    pub fn unprotect(&mut self) {
        self.drop_bindings();
        self.state = ProtectionState::Disposed;
    }

    /// Handles a host event. Returns `true` when the saver acted on it.
    pub fn dispatch(&mut self, form: &mut dyn FormDocument, event: FormEvent) -> bool {
        if matches!(self.state, ProtectionState::Disabled | ProtectionState::Disposed) || !self.is_bound(&event) {
            return false;
        }

        match event {
            FormEvent::Input(id) => {
                let Some(control) = form.controls().into_iter().find(|c| c.id == id) else {
                    return false;
                };
                self.save_field_immediately(form, &control)
            }
            FormEvent::Change(_) => {
                self.save_all(form);
                true
            }
            FormEvent::Submit | FormEvent::Reset => {
                self.release(form);
                true
            }
        }
    }

    /// Drives the periodic save. Call whenever `next_tick_in` has elapsed.
    pub fn tick(&mut self, form: &mut dyn FormDocument, now: Instant) -> TickResult {
        if matches!(self.state, ProtectionState::Disabled | ProtectionState::Disposed) {
            return TickResult::default();
        }
        let due = match self.timer.as_ref() {
            Some(timer) => timer.is_due(now),
            None => return TickResult::default(),
        };

        if due {
            let started = Instant::now();
            self.save_all(form);
            let finished_at = now.checked_add(started.elapsed()).unwrap_or(now);
            if let Some(timer) = self.timer.as_mut() {
                timer.reschedule(finished_at);
            }
        }

        TickResult {
            saved: due,
            next_tick_in: self.timer.as_ref().and_then(|t| t.time_until(now)),
        }
    }

    /// Captures every protected field. Calls `on_save` once for the whole pass.
    pub fn save_all(&mut self, form: &dyn FormDocument) {
        let scope = self.key_scope(form);
        let controls = form.controls();
        let mut groups_written: HashSet<String> = HashSet::new();
        let mut written = 0usize;

        for field in self.fields(&controls) {
            if field.excluded {
                continue;
            }
            let Some(name) = field.identity() else {
                continue;
            };
            let control = &field.control;

            let value = match field.kind {
                FieldKind::CheckboxGroup => {
                    if !groups_written.insert(name.to_string()) {
                        continue;
                    }
                    StoredValue::list(
                        controls
                            .iter()
                            .filter(|c| {
                                c.control_type == ControlType::Checkbox && c.checked && c.identity() == Some(name)
                            })
                            .map(|c| c.value.as_str()),
                    )
                }
                FieldKind::CheckboxSingle => StoredValue::flag(control.checked),
                FieldKind::Radio => {
                    if !control.checked {
                        continue;
                    }
                    StoredValue::text(control.value.as_str())
                }
                FieldKind::Text | FieldKind::MultiSelect | FieldKind::Other => {
                    StoredValue::text(control.value.as_str())
                }
            };

            let key = scope.key_for(name);
            trace!("save {key:?} = {:?}", value.as_str());
            self.storage.set(&key, value.as_str());
            written += 1;
        }

        debug!("save pass wrote {written} field(s)");
        self.config.callbacks.saved();
        self.mark_saved();
    }

    /// Writes one field without scanning the form. Used for per-keystroke saves.
    ///
    /// `on_save` is not called when the value is empty, but the empty value is still written.
    pub fn save_field_immediately(&mut self, form: &dyn FormDocument, control: &Control) -> bool {
        if !control.control_type.is_protectable() {
            return false;
        }
        let Some(name) = control.identity() else {
            return false;
        };
        if self.config.options.is_excluded(name) {
            return false;
        }

        let key = self.key_scope(form).key_for(name);
        trace!("save {key:?} = {:?}", control.value);
        self.storage.set(&key, &control.value);

        if !control.value.is_empty() {
            self.config.callbacks.saved();
        }
        self.mark_saved();
        true
    }

    /// Applies stored values to the live form. Returns the number of fields
    /// that had a stored value; `on_restore` fires only when that is non-zero.
    pub fn restore_all(&mut self, form: &mut dyn FormDocument) -> usize {
        let scope = self.key_scope(form);
        let controls = form.controls();
        let mut restored = 0usize;

        for field in self.fields(&controls) {
            if field.excluded {
                continue;
            }
            let Some(name) = field.identity() else {
                continue;
            };
            let Some(stored) = self.storage.get(&scope.key_for(name)).map(StoredValue::from) else {
                continue;
            };
            let control = &field.control;

            match field.kind {
                FieldKind::CheckboxSingle => form.set_checked(control.id, stored.as_flag()),
                FieldKind::CheckboxGroup => form.set_checked(control.id, stored.contains_item(&control.value)),
                FieldKind::Radio => {
                    if control.value == stored.as_str() {
                        form.set_checked(control.id, true);
                    }
                }
                FieldKind::Text | FieldKind::MultiSelect | FieldKind::Other => {
                    form.set_value(control.id, stored.as_str())
                }
            }
            restored += 1;
        }

        debug!("restore pass found {restored} stored field(s)");
        if restored > 0 {
            self.config.callbacks.restored();
        }
        restored
    }

    /// Removes every protected field's key, present or not. Bindings stay in place.
    pub fn release(&mut self, form: &dyn FormDocument) -> usize {
        let scope = self.key_scope(form);
        let controls = form.controls();
        let mut processed = 0usize;

        for field in self.fields(&controls) {
            if field.excluded {
                continue;
            }
            let Some(name) = field.identity() else {
                continue;
            };
            self.storage.remove(&scope.key_for(name));
            processed += 1;
        }

        debug!("release pass cleared {processed} field(s)");
        if processed > 0 {
            self.config.callbacks.released();
        }
        if matches!(self.state, ProtectionState::Protected | ProtectionState::Released) {
            self.state = ProtectionState::Released;
        }
        processed
    }

    /// Release requested by the page itself ("forget this form").
    pub fn manually_release_data(&mut self, form: &dyn FormDocument) -> Result<usize, FormStateError> {
        match self.state {
            ProtectionState::Disposed => Err(FormStateError::Disposed),
            ProtectionState::Disabled => Err(FormStateError::StorageUnavailable),
            _ => Ok(self.release(form)),
        }
    }

    fn bind_save(&mut self, form: &dyn FormDocument, now: Instant) {
        let interval = self.config.options.periodic_interval();
        if let Some(interval) = interval {
            self.timer = Some(RepeatingTimer::started(interval, now));
        }

        let controls = form.controls();
        for field in self.fields(&controls) {
            if field.excluded {
                continue;
            }
            if field.kind == FieldKind::Text && interval.is_none() {
                self.bindings.input.insert(field.control.id);
            }
            self.bindings.change.insert(field.control.id);
        }

        debug!(
            "bound {} input and {} change trigger(s), periodic save every {:?}",
            self.bindings.input.len(),
            self.bindings.change.len(),
            interval,
        );
    }

    // A later successful protect() binds again from scratch.
    fn drop_bindings(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.cancel();
        }
        self.timer = None;
        self.bindings = Bindings::default();
        self.started = false;
    }

    fn fields(&self, controls: &[Control]) -> Vec<ProtectedField> {
        let options = &self.config.options;
        ProtectedField::enumerate(controls, |name| options.is_excluded(name))
    }

    fn key_scope(&self, form: &dyn FormDocument) -> KeyScope {
        KeyScope::new(self.location.as_ref(), form, &self.config.options)
    }

    fn mark_saved(&mut self) {
        if self.state == ProtectionState::Released {
            self.state = ProtectionState::Protected;
        }
    }
}
