use super::{DateRange, Vrn, vat_path};
use crate::enumeration::{InvalidFieldValue, assign};
use crate::{ApiRequest, CallHeaders, CallPath, CallQuery, GOV_TEST_SCENARIO, RequestMethod};

crate::validated_enum! {
    /// Sandbox scenarios of the payments endpoint.
    pub enum PaymentsGovTestScenario("Gov-Test-Scenario") {
        /// A single payment.
        SinglePayment => "SINGLE_PAYMENT",
        /// Several payments.
        MultiplePayments => "MULTIPLE_PAYMENTS",
        /// The trader is insolvent.
        InsolventTrader => "INSOLVENT_TRADER",
    }
}

/// `GET /organisations/vat/{vrn}/payments?from&to`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveVatPaymentsRequest {
    vrn: Vrn,
    range: DateRange,
    gov_test_scenario: Option<PaymentsGovTestScenario>,
}

impl RetrieveVatPaymentsRequest {
    /// Creates the request for the payments received in `from`..`to`.
    pub fn new(vrn: impl Into<String>, from: &str, to: &str) -> Result<Self, InvalidFieldValue> {
        Ok(Self {
            vrn: Vrn::new(vrn)?,
            range: DateRange::parse(from, to)?,
            gov_test_scenario: None,
        })
    }

    /// Sets the sandbox scenario from its code; the request is unchanged on error.
    pub fn set_gov_test_scenario(&mut self, scenario: &str) -> Result<&mut Self, InvalidFieldValue> {
        assign(&mut self.gov_test_scenario, scenario)?;
        Ok(self)
    }

    /// Sets the sandbox scenario.
    #[must_use]
    pub fn with_gov_test_scenario(mut self, scenario: PaymentsGovTestScenario) -> Self {
        self.gov_test_scenario = Some(scenario);
        self
    }
}

impl ApiRequest for RetrieveVatPaymentsRequest {
    fn method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn path(&self) -> CallPath {
        CallPath::from(vat_path("/payments")).add_param("vrn", self.vrn.as_str())
    }

    fn query(&self) -> CallQuery {
        CallQuery::new()
            .add_param("from", self.range.from())
            .add_param("to", self.range.to())
    }

    fn headers(&self) -> CallHeaders {
        CallHeaders::new().add_optional(GOV_TEST_SCENARIO, self.gov_test_scenario)
    }
}
