use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{DateRange, Vrn, vat_path};
use crate::enumeration::{InvalidFieldValue, assign};
use crate::{ApiRequest, CallHeaders, CallPath, CallQuery, GOV_TEST_SCENARIO, RequestMethod};

crate::validated_enum! {
    /// Status filter of the obligations endpoint.
    pub enum ObligationStatus("status") {
        /// Return not submitted yet.
        Open => "O",
        /// Return submitted.
        Fulfilled => "F",
    }
}

crate::validated_enum! {
    /// Sandbox scenarios of the obligations endpoint.
    pub enum ObligationsGovTestScenario("Gov-Test-Scenario") {
        /// Quarterly obligations, none met.
        QuarterlyNoneMet => "QUARTERLY_NONE_MET",
        /// Quarterly obligations, one met.
        QuarterlyOneMet => "QUARTERLY_ONE_MET",
        /// Quarterly obligations, two met.
        QuarterlyTwoMet => "QUARTERLY_TWO_MET",
        /// Quarterly obligations, three met.
        QuarterlyThreeMet => "QUARTERLY_THREE_MET",
        /// Quarterly obligations, four met.
        QuarterlyFourMet => "QUARTERLY_FOUR_MET",
        /// Monthly obligations, none met.
        MonthlyNoneMet => "MONTHLY_NONE_MET",
        /// Monthly obligations, one met.
        MonthlyOneMet => "MONTHLY_ONE_MET",
        /// Monthly obligations, two met.
        MonthlyTwoMet => "MONTHLY_TWO_MET",
        /// Monthly obligations, three met.
        MonthlyThreeMet => "MONTHLY_THREE_MET",
        /// One open monthly obligation.
        MonthlyObs01Open => "MONTHLY_OBS_01_OPEN",
        /// Six open monthly obligations.
        MonthlyObs06Open => "MONTHLY_OBS_06_OPEN",
        /// Twelve fulfilled monthly obligations.
        MonthlyObs12Fulfilled => "MONTHLY_OBS_12_FULFILLED",
        /// One open quarterly obligation.
        QuarterlyObs01Open => "QUARTERLY_OBS_01_OPEN",
        /// Four fulfilled quarterly obligations.
        QuarterlyObs04Fulfilled => "QUARTERLY_OBS_04_FULFILLED",
        /// Several open monthly obligations.
        MultipleOpenMonthly => "MULTIPLE_OPEN_MONTHLY",
        /// Several open quarterly obligations.
        MultipleOpenQuarterly => "MULTIPLE_OPEN_QUARTERLY",
        /// An obligation spanning two calendar years.
        ObsSpansMultipleYears => "OBS_SPANS_MULTIPLE_YEARS",
        /// The trader is insolvent.
        InsolventTrader => "INSOLVENT_TRADER",
        /// No obligation found.
        NotFound => "NOT_FOUND",
    }
}

/// `GET /organisations/vat/{vrn}/obligations?from&to[&status]`
///
/// ```rust
/// use hmrc_mtd_core::vat::{ObligationStatus, RetrieveVatObligationsRequest};
///
/// let request = RetrieveVatObligationsRequest::new_with_status("123456789", "2018-01-01", "2018-12-31", "O")?;
/// assert_eq!(request.status(), Some(ObligationStatus::Open));
///
/// assert!(RetrieveVatObligationsRequest::new_with_status("123456789", "2018-01-01", "2018-12-31", "A").is_err());
/// # Ok::<(), hmrc_mtd_core::InvalidFieldValue>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveVatObligationsRequest {
    vrn: Vrn,
    range: DateRange,
    status: Option<ObligationStatus>,
    gov_test_scenario: Option<ObligationsGovTestScenario>,
}

impl RetrieveVatObligationsRequest {
    /// Creates the request for every obligation in `from`..`to`.
    pub fn new(
        vrn: impl Into<String>,
        from: &str,
        to: &str,
    ) -> Result<Self, InvalidFieldValue> {
        Ok(Self {
            vrn: Vrn::new(vrn)?,
            range: DateRange::parse(from, to)?,
            status: None,
            gov_test_scenario: None,
        })
    }

    /// Creates the request filtered on a status code (`O` or `F`).
    pub fn new_with_status(
        vrn: impl Into<String>,
        from: &str,
        to: &str,
        status: &str,
    ) -> Result<Self, InvalidFieldValue> {
        let mut request = Self::new(vrn, from, to)?;
        request.set_status(status)?;
        Ok(request)
    }

    /// Returns the VAT registration number.
    pub fn vrn(&self) -> &Vrn {
        &self.vrn
    }

    /// Returns the date range.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Returns the status filter.
    pub fn status(&self) -> Option<ObligationStatus> {
        self.status
    }

    /// Returns the sandbox scenario.
    pub fn gov_test_scenario(&self) -> Option<ObligationsGovTestScenario> {
        self.gov_test_scenario
    }

    /// Sets the status filter from its code; the request is unchanged on error.
    pub fn set_status(&mut self, status: &str) -> Result<&mut Self, InvalidFieldValue> {
        assign(&mut self.status, status)?;
        Ok(self)
    }

    /// Sets the status filter.
    #[must_use]
    pub fn with_status(mut self, status: ObligationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the sandbox scenario from its code; the request is unchanged on error.
    pub fn set_gov_test_scenario(&mut self, scenario: &str) -> Result<&mut Self, InvalidFieldValue> {
        assign(&mut self.gov_test_scenario, scenario)?;
        Ok(self)
    }

    /// Sets the sandbox scenario.
    #[must_use]
    pub fn with_gov_test_scenario(mut self, scenario: ObligationsGovTestScenario) -> Self {
        self.gov_test_scenario = Some(scenario);
        self
    }
}

impl ApiRequest for RetrieveVatObligationsRequest {
    fn method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn path(&self) -> CallPath {
        CallPath::from(vat_path("/obligations")).add_param("vrn", self.vrn.as_str())
    }

    fn query(&self) -> CallQuery {
        CallQuery::new()
            .add_param("from", self.range.from())
            .add_param("to", self.range.to())
            .add_optional("status", self.status)
    }

    fn headers(&self) -> CallHeaders {
        CallHeaders::new().add_optional(GOV_TEST_SCENARIO, self.gov_test_scenario)
    }
}

/// Response of the obligations endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatObligations {
    /// The obligations in the requested range.
    pub obligations: Vec<VatObligation>,
}

/// A VAT return the trader has to file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VatObligation {
    /// First day of the period.
    pub start: Date,
    /// Last day of the period.
    pub end: Date,
    /// Filing deadline.
    pub due: Date,
    /// Whether the return was filed.
    pub status: ObligationStatus,
    /// Key to use when viewing or submitting the return.
    pub period_key: String,
    /// When the return was received, for fulfilled obligations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<Date>,
}
