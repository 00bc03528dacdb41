//! Form state, validation, and the submit state machine.
//!
//! Phases:
//!
//! ```text
//! Idle --begin_lists_load--> ListsLoading --finish_lists_load--> Ready
//! Ready --begin_submit--> Submitting --finish_submit--> Ready
//! ```
//!
//! A failed submit returns to `Ready` with the error captured; `phase()`
//! reports `Error` until the next submit clears it. A list-load failure never
//! blocks the form: the selectors just start empty.

pub mod selector;

pub use selector::SearchableSelector;

use tracing::warn;

use crate::data::api::Predictor;
use crate::domain::{PredictionInput, RawEstimate, Report};
use crate::error::AppError;
use crate::report::build_report;

pub const AGE_MAX: u32 = 50;
pub const DEFAULT_AREA_SQFT: f64 = 1200.0;
pub const DEFAULT_AGE_YEARS: u32 = 5;
pub const DEFAULT_BEDROOMS: u32 = 2;

const MISSING_SELECTION: &str = "Please choose locality and property type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    ListsLoading,
    Ready,
    Submitting,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Locality,
    PropertyType,
    Area,
    Age,
    Bedrooms,
}

/// Inline validation message attached to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    Invalid(FieldError),
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(SubmitRejection),
    Estimated(Report),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FormController {
    phase: FormPhase,
    pub locality: SearchableSelector,
    pub property_type: SearchableSelector,
    area_input: String,
    age: u32,
    age_input: String,
    bedrooms: u32,
    field_error: Option<FieldError>,
    error: Option<String>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self {
            phase: FormPhase::Idle,
            locality: SearchableSelector::new(Vec::new()),
            property_type: SearchableSelector::new(Vec::new()),
            area_input: DEFAULT_AREA_SQFT.to_string(),
            age: DEFAULT_AGE_YEARS,
            age_input: DEFAULT_AGE_YEARS.to_string(),
            bedrooms: DEFAULT_BEDROOMS,
            field_error: None,
            error: None,
        }
    }

    pub fn phase(&self) -> FormPhase {
        match self.phase {
            FormPhase::Ready if self.error.is_some() => FormPhase::Error,
            phase => phase,
        }
    }

    pub fn field_error(&self) -> Option<&FieldError> {
        self.field_error.as_ref()
    }

    /// Message of the last failed prediction, if not yet cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// No-op while a submit is in flight.
    pub fn begin_lists_load(&mut self) {
        if self.phase != FormPhase::Submitting {
            self.phase = FormPhase::ListsLoading;
        }
    }

    /// Populate the selectors (title-cased) or leave them empty on failure.
    /// Either way the form becomes usable.
    pub fn finish_lists_load(&mut self, lists: Result<(Vec<String>, Vec<String>), AppError>) {
        match lists {
            Ok((locations, property_types)) => {
                self.locality
                    .set_options(locations.iter().map(|s| title_case(s)).collect());
                self.property_type
                    .set_options(property_types.iter().map(|s| title_case(s)).collect());
            }
            Err(err) => {
                warn!(%err, "failed to load option lists");
                self.locality.set_options(Vec::new());
                self.property_type.set_options(Vec::new());
            }
        }
        if self.phase != FormPhase::Submitting {
            self.phase = FormPhase::Ready;
        }
    }

    /// Validate and enter `Submitting`. On rejection the phase is unchanged
    /// and no request must be made.
    pub fn begin_submit(&mut self) -> Result<PredictionInput, SubmitRejection> {
        if self.phase == FormPhase::Submitting {
            return Err(SubmitRejection::InFlight);
        }

        self.error = None;
        self.field_error = None;

        match self.validated_input() {
            Ok(input) => {
                self.phase = FormPhase::Submitting;
                Ok(input)
            }
            Err(field_error) => {
                self.field_error = Some(field_error.clone());
                Err(SubmitRejection::Invalid(field_error))
            }
        }
    }

    /// Resolve the in-flight submit. Returns to `Ready` either way.
    pub fn finish_submit(
        &mut self,
        input: &PredictionInput,
        estimate: Result<RawEstimate, AppError>,
    ) -> SubmitOutcome {
        self.phase = FormPhase::Ready;
        match estimate {
            Ok(estimate) => SubmitOutcome::Estimated(build_report(input, estimate)),
            Err(err) => {
                let message = err.message().to_string();
                self.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Validate, call `predictor` once, and build the report.
    pub fn submit_with(&mut self, predictor: &dyn Predictor) -> SubmitOutcome {
        let input = match self.begin_submit() {
            Ok(input) => input,
            Err(rejection) => return SubmitOutcome::Rejected(rejection),
        };
        let estimate = predictor.predict(&input);
        self.finish_submit(&input, estimate)
    }

    pub fn area_input(&self) -> &str {
        &self.area_input
    }

    pub fn area_push(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '.' && !self.area_input.contains('.')) {
            self.area_input.push(c);
        }
    }

    pub fn area_backspace(&mut self) {
        self.area_input.pop();
    }

    pub fn set_area(&mut self, area_sqft: f64) {
        self.area_input = area_sqft.to_string();
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Text of the numeric age field (may be mid-edit).
    pub fn age_input(&self) -> &str {
        &self.age_input
    }

    /// Set the age from either widget; clamped into `[0, AGE_MAX]`.
    pub fn set_age(&mut self, age: i64) {
        self.age = age.clamp(0, AGE_MAX as i64) as u32;
        self.age_input = self.age.to_string();
    }

    /// Slider step.
    pub fn step_age(&mut self, delta: i64) {
        self.set_age(self.age as i64 + delta);
    }

    pub fn age_push(&mut self, c: char) {
        if c.is_ascii_digit() && self.age_input.len() < 3 {
            self.age_input.push(c);
        }
    }

    pub fn age_backspace(&mut self) {
        self.age_input.pop();
    }

    /// Apply the numeric field to the shared age value. Blank or unparsable
    /// text reverts to the current age.
    pub fn commit_age_input(&mut self) {
        match self.age_input.trim().parse::<i64>() {
            Ok(age) => self.set_age(age),
            Err(_) => self.age_input = self.age.to_string(),
        }
    }

    pub fn bedrooms(&self) -> u32 {
        self.bedrooms
    }

    pub fn increment_bedrooms(&mut self) {
        self.bedrooms = self.bedrooms.saturating_add(1);
    }

    pub fn decrement_bedrooms(&mut self) {
        self.bedrooms = self.bedrooms.saturating_sub(1);
    }

    pub fn set_bedrooms(&mut self, bedrooms: u32) {
        self.bedrooms = bedrooms;
    }

    fn validated_input(&mut self) -> Result<PredictionInput, FieldError> {
        let locality = self.locality.value().unwrap_or("").to_string();
        if locality.is_empty() {
            return Err(FieldError::new(FormField::Locality, MISSING_SELECTION));
        }
        let property_type = self.property_type.value().unwrap_or("").to_string();
        if property_type.is_empty() {
            return Err(FieldError::new(FormField::PropertyType, MISSING_SELECTION));
        }

        let area_sqft = match self.area_input.trim().parse::<f64>() {
            Ok(area) if area.is_finite() && area > 0.0 => area,
            _ => {
                return Err(FieldError::new(
                    FormField::Area,
                    "Area must be a positive number of square feet",
                ));
            }
        };

        self.commit_age_input();

        Ok(PredictionInput {
            locality,
            property_type,
            area_sqft,
            age_years: self.age,
            bedrooms: self.bedrooms,
        })
    }
}

/// Lowercase, then capitalize the first letter of each space-delimited word.
pub fn title_case(s: &str) -> String {
    s.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPredictor {
        calls: AtomicUsize,
        result: Result<RawEstimate, AppError>,
    }

    impl CountingPredictor {
        fn ok(estimated_price: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(RawEstimate { estimated_price }),
            }
        }

        fn failing(err: AppError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Err(err),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Predictor for CountingPredictor {
        fn predict(&self, _input: &PredictionInput) -> Result<RawEstimate, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn loaded_form() -> FormController {
        let mut form = FormController::new();
        form.begin_lists_load();
        form.finish_lists_load(Ok((
            vec!["GACHIBOWLI".to_string(), "banjara hills".to_string()],
            vec!["apartment".to_string(), "Independent HOUSE".to_string()],
        )));
        form
    }

    #[test]
    fn title_case_normalizes_each_word() {
        assert_eq!(title_case("BANJARA hills"), "Banjara Hills");
        assert_eq!(title_case("independent house"), "Independent House");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("a  b"), "A  B");
    }

    #[test]
    fn lists_load_moves_to_ready_with_title_cased_options() {
        let mut form = FormController::new();
        assert_eq!(form.phase(), FormPhase::Idle);
        form.begin_lists_load();
        assert_eq!(form.phase(), FormPhase::ListsLoading);
        form.finish_lists_load(Ok((vec!["KONDAPUR".to_string()], vec!["villa".to_string()])));
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.locality.options(), ["Kondapur"]);
        assert_eq!(form.property_type.options(), ["Villa"]);
    }

    #[test]
    fn failed_lists_load_still_reaches_ready_with_empty_options() {
        let mut form = FormController::new();
        form.begin_lists_load();
        form.finish_lists_load(Err(AppError::network("offline")));
        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(form.locality.options().is_empty());
        assert!(form.property_type.options().is_empty());
    }

    #[test]
    fn missing_locality_is_rejected_without_a_request() {
        let mut form = loaded_form();
        form.property_type.select_value("Apartment");
        let predictor = CountingPredictor::ok(1.0);

        let outcome = form.submit_with(&predictor);
        match outcome {
            SubmitOutcome::Rejected(SubmitRejection::Invalid(err)) => {
                assert_eq!(err.field, FormField::Locality);
                assert_eq!(err.message, "Please choose locality and property type");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(predictor.calls(), 0);
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.field_error().map(|e| e.field), Some(FormField::Locality));
    }

    #[test]
    fn missing_property_type_is_rejected() {
        let mut form = loaded_form();
        form.locality.select_value("Gachibowli");
        let err = form.begin_submit().unwrap_err();
        assert_eq!(
            err,
            SubmitRejection::Invalid(FieldError::new(FormField::PropertyType, MISSING_SELECTION))
        );
    }

    #[test]
    fn non_positive_area_is_rejected() {
        let mut form = loaded_form();
        form.locality.select_value("Gachibowli");
        form.property_type.select_value("Apartment");
        form.set_area(0.0);
        let predictor = CountingPredictor::ok(1.0);
        assert!(matches!(
            form.submit_with(&predictor),
            SubmitOutcome::Rejected(SubmitRejection::Invalid(FieldError { field: FormField::Area, .. }))
        ));
        assert_eq!(predictor.calls(), 0);
    }

    #[test]
    fn successful_submit_builds_report_and_returns_to_ready() {
        let mut form = loaded_form();
        form.locality.select_value("banjara hills");
        form.property_type.select_value("apartment");
        form.increment_bedrooms();
        let predictor = CountingPredictor::ok(0.85);

        let SubmitOutcome::Estimated(report) = form.submit_with(&predictor) else {
            panic!("expected a report");
        };
        assert_eq!(predictor.calls(), 1);
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(report.locality, "Banjara Hills");
        assert_eq!(report.property_type, "Apartment");
        assert_eq!(report.area_sqft, DEFAULT_AREA_SQFT);
        assert_eq!(report.age_years, DEFAULT_AGE_YEARS);
        assert_eq!(report.bedrooms, 3);
        assert_eq!(report.estimated, 0.85);
    }

    #[test]
    fn client_error_is_captured_and_cleared_by_next_submit() {
        let mut form = loaded_form();
        form.locality.select_value("Gachibowli");
        form.property_type.select_value("Apartment");

        let failing = CountingPredictor::failing(AppError::http(500, "boom"));
        assert_eq!(
            form.submit_with(&failing),
            SubmitOutcome::Failed("API error 500: boom".to_string())
        );
        assert_eq!(form.phase(), FormPhase::Error);
        assert_eq!(form.error(), Some("API error 500: boom"));

        let ok = CountingPredictor::ok(2.0);
        assert!(matches!(form.submit_with(&ok), SubmitOutcome::Estimated(_)));
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.error(), None);
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut form = loaded_form();
        form.locality.select_value("Gachibowli");
        form.property_type.select_value("Apartment");

        let input = form.begin_submit().unwrap();
        assert_eq!(form.phase(), FormPhase::Submitting);
        assert_eq!(form.begin_submit().unwrap_err(), SubmitRejection::InFlight);

        form.finish_submit(&input, Ok(RawEstimate { estimated_price: 1.2 }));
        assert_eq!(form.phase(), FormPhase::Ready);
    }

    #[test]
    fn reloading_lists_does_not_interrupt_a_submit() {
        let mut form = loaded_form();
        form.locality.select_value("Gachibowli");
        form.property_type.select_value("Apartment");
        let input = form.begin_submit().unwrap();

        form.begin_lists_load();
        assert_eq!(form.phase(), FormPhase::Submitting);
        form.finish_lists_load(Ok((vec!["Gachibowli".to_string()], vec!["Apartment".to_string()])));
        assert_eq!(form.phase(), FormPhase::Submitting);

        form.finish_submit(&input, Ok(RawEstimate { estimated_price: 1.0 }));
        assert_eq!(form.phase(), FormPhase::Ready);
    }

    #[test]
    fn bedrooms_floor_at_zero() {
        let mut form = FormController::new();
        for _ in 0..5 {
            form.decrement_bedrooms();
        }
        assert_eq!(form.bedrooms(), 0);
        form.increment_bedrooms();
        assert_eq!(form.bedrooms(), 1);
    }

    #[test]
    fn age_widgets_share_one_clamped_value() {
        let mut form = FormController::new();
        form.step_age(100);
        assert_eq!(form.age(), 50);
        assert_eq!(form.age_input(), "50");

        form.age_backspace();
        form.age_backspace();
        form.age_push('7');
        form.commit_age_input();
        assert_eq!(form.age(), 7);

        form.step_age(-10);
        assert_eq!(form.age(), 0);
        assert_eq!(form.age_input(), "0");

        form.age_backspace();
        form.commit_age_input();
        assert_eq!(form.age_input(), "0");
    }

    #[test]
    fn area_field_accepts_one_decimal_point() {
        let mut form = FormController::new();
        form.set_area(12.0);
        form.area_push('.');
        form.area_push('5');
        form.area_push('.');
        form.area_push('x');
        assert_eq!(form.area_input(), "12.5");
    }
}
