use shared::domain::AnalysisRequest;

use crate::state::Phase;

/// User-entered fields for one analysis request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    cpf: String,
    email: String,
    ref_id_geoloc: String,
}

impl FormState {
    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn ref_id_geoloc(&self) -> &str {
        &self.ref_id_geoloc
    }

    pub fn set_cpf(&mut self, cpf: impl Into<String>) {
        self.cpf = cpf.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_ref_id_geoloc(&mut self, ref_id_geoloc: impl Into<String>) {
        self.ref_id_geoloc = ref_id_geoloc.into();
    }

    pub fn has_cpf(&self) -> bool {
        !self.cpf.is_empty()
    }

    pub fn can_submit(&self, phase: Phase) -> bool {
        self.has_cpf() && phase != Phase::Submitting
    }

    pub fn to_request(&self) -> AnalysisRequest {
        AnalysisRequest::new(self.cpf.clone(), self.email.clone(), &self.ref_id_geoloc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_submit_needs_cpf_and_idle_phase() {
        let mut form = FormState::default();
        for phase in [Phase::Uninitialized, Phase::Ready, Phase::Submitting] {
            assert!(!form.can_submit(phase));
        }

        form.set_cpf("123.456.789-00");
        assert!(form.can_submit(Phase::Uninitialized));
        assert!(form.can_submit(Phase::Ready));
        assert!(!form.can_submit(Phase::Submitting));
    }

    #[test]
    fn email_does_not_gate_submission() {
        let mut form = FormState::default();
        form.set_cpf("1");
        form.set_email("not-an-email");
        assert!(form.can_submit(Phase::Ready));
    }

    #[test]
    fn request_normalizes_empty_ref_id() {
        let mut form = FormState::default();
        form.set_cpf("1");
        form.set_email("user@example.com");
        assert_eq!(form.to_request().ref_id, None);

        form.set_ref_id_geoloc("geoloc-ref-123");
        let request = form.to_request();
        assert_eq!(request.ref_id.as_deref(), Some("geoloc-ref-123"));
        assert_eq!(request.email, "user@example.com");
    }
}
