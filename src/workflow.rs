// 🔁 Add / delete / reload workflow
// Command functions any front end can call, plus the form state a shell renders.
//
// Add:    Validating -> CheckingDuplicate -> Inserting -> reload
// Delete: (no selection -> rejected) | Deleting -> reload
// Any rejection or store failure returns to idle and leaves the listing as it was.

use crate::car::{Car, CarInput};
use crate::db::CarStore;
use crate::error::{CarError, CarResult, Rejection};
use crate::validator::validate;
use log::{error, info};

// ============================================================================
// COMMAND INTERFACE
// ============================================================================

/// Validate raw input and write it. Returns the new id.
pub fn submit_add(store: &CarStore, input: &CarInput) -> CarResult<i64> {
    let car = validate(input).map_err(|reason| {
        info!("event=car_add module=workflow status=rejected reason=\"{}\"", reason);
        reason
    })?;

    store.write(&car)
}

/// Delete the selected car. `None` means the operator selected nothing.
pub fn submit_delete(store: &CarStore, selected_id: Option<i64>) -> CarResult<usize> {
    let Some(id) = selected_id else {
        info!("event=car_delete module=workflow status=rejected reason=no_selection");
        return Err(Rejection::NoSelection.into());
    };

    store.delete(id)
}

// ============================================================================
// FORM STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// What a presentation shell shows: the raw field text, the current listing,
/// and the latest message for the operator.
pub struct CarForm {
    store: CarStore,
    pub input: CarInput,
    cars: Vec<Car>,
    notice: Option<Notice>,
}

impl CarForm {
    /// Build the form and load the initial listing.
    pub fn load(store: CarStore) -> CarResult<Self> {
        let cars = store.list_all()?;
        Ok(Self {
            store,
            input: CarInput::default(),
            cars,
            notice: None,
        })
    }

    pub fn store(&self) -> &CarStore {
        &self.store
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Replace the listing with a fresh read. On failure the previous listing
    /// stays on screen and the error is posted.
    pub fn reload(&mut self) -> CarResult<()> {
        match self.store.list_all() {
            Ok(cars) => {
                self.cars = cars;
                Ok(())
            }
            Err(err) => Err(self.report(err)),
        }
    }

    /// Submit the current input. On success the fields are cleared and the
    /// listing reloaded. Returns `Ok` once the row is stored, even if the
    /// reload afterwards fails.
    pub fn submit_add(&mut self) -> CarResult<i64> {
        let id = submit_add(&self.store, &self.input).map_err(|err| self.report(err))?;

        self.input.clear();
        self.refresh_after(format!("car added (id {})", id));
        Ok(id)
    }

    /// Delete the car with `selected_id`, or reject when nothing is selected.
    pub fn submit_delete(&mut self, selected_id: Option<i64>) -> CarResult<usize> {
        let removed = submit_delete(&self.store, selected_id).map_err(|err| self.report(err))?;

        let text = if removed == 0 {
            "car was already gone"
        } else {
            "car deleted"
        };
        self.refresh_after(text.to_string());
        Ok(removed)
    }

    /// Reload after a committed change. A failed reload does not undo the
    /// change: the old listing stays and the notice says both things.
    fn refresh_after(&mut self, done: String) {
        match self.store.list_all() {
            Ok(cars) => {
                self.cars = cars;
                self.notice = Some(Notice::Info(done));
            }
            Err(err) => {
                error!("event=car_list module=workflow status=error error={}", err);
                self.notice = Some(Notice::Error(format!(
                    "{}; listing refresh failed: {}",
                    done, err
                )));
            }
        }
    }

    fn report(&mut self, err: CarError) -> CarError {
        match &err {
            CarError::Rejected(reason) => {
                self.notice = Some(Notice::Error(reason.to_string()));
            }
            CarError::Store(cause) => {
                error!("event=store_failure module=workflow status=error error={}", cause);
                self.notice = Some(Notice::Error(err.to_string()));
            }
        }
        err
    }
}
