//! Patient information step

use super::ScreeningState;
use crate::error::FieldError;
use crate::notify::Notice;
use crate::session::{PatientForm, Step};

/// Current form contents, pre-filled from a saved identity
pub fn patient_info(state: &ScreeningState) -> PatientForm {
    state
        .store()
        .identity()
        .map(PatientForm::from_identity)
        .unwrap_or_default()
}

/// Field-specific messages for the form as it stands; empty when valid
pub fn validate_patient_info(form: PatientForm) -> Vec<FieldError> {
    match form.validate() {
        Ok(_) => Vec::new(),
        Err(e) => e.errors,
    }
}

/// Validate and save the patient's details, returning the next step
pub fn submit_patient_info(form: PatientForm, state: &ScreeningState) -> Result<Step, String> {
    let identity = form.validate().map_err(|e| e.to_string())?;

    state.store().set_identity(Some(identity));
    tracing::info!("[Session] Patient information saved");
    state.notify(Notice::success("Information saved successfully!"));

    Ok(Step::Questionnaire)
}
