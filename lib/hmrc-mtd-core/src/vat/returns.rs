use serde::{Deserialize, Serialize};

use super::{PeriodKey, Vrn, vat_path};
use crate::enumeration::{InvalidFieldValue, assign};
use crate::{
    ApiRequest, CallBody, CallHeaders, CallPath, GOV_TEST_SCENARIO, MtdError, RequestMethod,
};

crate::validated_enum! {
    /// Sandbox scenarios of the view return endpoint.
    pub enum ViewReturnGovTestScenario("Gov-Test-Scenario") {
        /// The requested period is too long.
        DateRangeTooLarge => "DATE_RANGE_TOO_LARGE",
        /// The trader is insolvent.
        InsolventTrader => "INSOLVENT_TRADER",
    }
}

crate::validated_enum! {
    /// Sandbox scenarios of the submit return endpoint.
    pub enum SubmitReturnGovTestScenario("Gov-Test-Scenario") {
        /// The VAT registration number is invalid.
        InvalidVrn => "INVALID_VRN",
        /// The period key is invalid.
        InvalidPeriodKey => "INVALID_PERIODKEY",
        /// The body does not match the schema.
        InvalidPayload => "INVALID_PAYLOAD",
        /// A return was already submitted for the period.
        DuplicateSubmission => "DUPLICATE_SUBMISSION",
        /// The period has not ended yet.
        TaxPeriodNotEnded => "TAX_PERIOD_NOT_ENDED",
        /// The trader is insolvent.
        InsolventTrader => "INSOLVENT_TRADER",
    }
}

/// `GET /organisations/vat/{vrn}/returns/{periodKey}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewVatReturnRequest {
    vrn: Vrn,
    period_key: PeriodKey,
    gov_test_scenario: Option<ViewReturnGovTestScenario>,
}

impl ViewVatReturnRequest {
    /// Creates the request for the return of a period.
    pub fn new(vrn: impl Into<String>, period_key: impl Into<String>) -> Result<Self, InvalidFieldValue> {
        Ok(Self {
            vrn: Vrn::new(vrn)?,
            period_key: PeriodKey::new(period_key)?,
            gov_test_scenario: None,
        })
    }

    /// Returns the period key.
    pub fn period_key(&self) -> &PeriodKey {
        &self.period_key
    }

    /// Sets the sandbox scenario from its code; the request is unchanged on error.
    pub fn set_gov_test_scenario(&mut self, scenario: &str) -> Result<&mut Self, InvalidFieldValue> {
        assign(&mut self.gov_test_scenario, scenario)?;
        Ok(self)
    }

    /// Sets the sandbox scenario.
    #[must_use]
    pub fn with_gov_test_scenario(mut self, scenario: ViewReturnGovTestScenario) -> Self {
        self.gov_test_scenario = Some(scenario);
        self
    }
}

impl ApiRequest for ViewVatReturnRequest {
    fn method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn path(&self) -> CallPath {
        CallPath::from(vat_path("/returns/{periodKey}"))
            .add_param("vrn", self.vrn.as_str())
            .add_param("periodKey", self.period_key.as_str())
    }

    fn headers(&self) -> CallHeaders {
        CallHeaders::new().add_optional(GOV_TEST_SCENARIO, self.gov_test_scenario)
    }
}

/// The nine-box VAT return.
///
/// Boxes 1 to 5 are amounts in pounds and pence, boxes 6 to 9 whole pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVatReturnBody {
    /// Period of the return.
    pub period_key: String,
    /// Box 1: VAT due on sales.
    pub vat_due_sales: f64,
    /// Box 2: VAT due on acquisitions from other EC member states.
    pub vat_due_acquisitions: f64,
    /// Box 3: total VAT due.
    pub total_vat_due: f64,
    /// Box 4: VAT reclaimed on purchases.
    pub vat_reclaimed_curr_period: f64,
    /// Box 5: net VAT to pay or reclaim.
    pub net_vat_due: f64,
    /// Box 6: total sales excluding VAT.
    #[serde(rename = "totalValueSalesExVAT")]
    pub total_value_sales_ex_vat: i64,
    /// Box 7: total purchases excluding VAT.
    #[serde(rename = "totalValuePurchasesExVAT")]
    pub total_value_purchases_ex_vat: i64,
    /// Box 8: total supplies of goods to other EC member states.
    #[serde(rename = "totalValueGoodsSuppliedExVAT")]
    pub total_value_goods_supplied_ex_vat: i64,
    /// Box 9: total acquisitions of goods from other EC member states.
    #[serde(rename = "totalAcquisitionsExVAT")]
    pub total_acquisitions_ex_vat: i64,
    /// The user's declaration that the return is final. Must be `true`.
    pub finalised: bool,
}

const MAX_AMOUNT: f64 = 9_999_999_999_999.99;
const MAX_NET_AMOUNT: f64 = 99_999_999_999.99;
const MAX_WHOLE_AMOUNT: i64 = 9_999_999_999_999;

fn check_amount(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), InvalidFieldValue> {
    // the wire form is the shortest round-trip representation
    let text = value.to_string();
    let decimals = text.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    if value.is_finite() && (min..=max).contains(&value) && decimals <= 2 {
        Ok(())
    } else {
        Err(InvalidFieldValue::rule(
            field,
            text,
            format!("an amount between {min:.2} and {max:.2} with at most two decimals"),
        ))
    }
}

fn check_whole_amount(field: &'static str, value: i64) -> Result<(), InvalidFieldValue> {
    if (-MAX_WHOLE_AMOUNT..=MAX_WHOLE_AMOUNT).contains(&value) {
        Ok(())
    } else {
        Err(InvalidFieldValue::rule(
            field,
            value.to_string(),
            format!("a whole amount between {} and {MAX_WHOLE_AMOUNT}", -MAX_WHOLE_AMOUNT),
        ))
    }
}

impl SubmitVatReturnBody {
    /// Checks the rules HMRC enforces on the period, the amounts and the declaration.
    ///
    /// Boxes 1 to 4 accept at most two decimals within ±9 999 999 999 999.99,
    /// box 5 is non-negative up to 99 999 999 999.99 and boxes 6 to 9 are
    /// whole pounds within ±9 999 999 999 999.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFieldValue`] naming the first field breaking a rule.
    pub fn validate(&self) -> Result<(), InvalidFieldValue> {
        PeriodKey::new(self.period_key.as_str())?;

        check_amount("vatDueSales", self.vat_due_sales, -MAX_AMOUNT, MAX_AMOUNT)?;
        check_amount("vatDueAcquisitions", self.vat_due_acquisitions, -MAX_AMOUNT, MAX_AMOUNT)?;
        check_amount("totalVatDue", self.total_vat_due, -MAX_AMOUNT, MAX_AMOUNT)?;
        check_amount(
            "vatReclaimedCurrPeriod",
            self.vat_reclaimed_curr_period,
            -MAX_AMOUNT,
            MAX_AMOUNT,
        )?;
        check_amount("netVatDue", self.net_vat_due, 0.0, MAX_NET_AMOUNT)?;

        check_whole_amount("totalValueSalesExVAT", self.total_value_sales_ex_vat)?;
        check_whole_amount("totalValuePurchasesExVAT", self.total_value_purchases_ex_vat)?;
        check_whole_amount("totalValueGoodsSuppliedExVAT", self.total_value_goods_supplied_ex_vat)?;
        check_whole_amount("totalAcquisitionsExVAT", self.total_acquisitions_ex_vat)?;

        if !self.finalised {
            return Err(InvalidFieldValue::rule("finalised", "false", "true"));
        }
        Ok(())
    }
}

/// `POST /organisations/vat/{vrn}/returns`
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitVatReturnRequest {
    vrn: Vrn,
    body: SubmitVatReturnBody,
    gov_test_scenario: Option<SubmitReturnGovTestScenario>,
}

impl SubmitVatReturnRequest {
    /// Creates the request, validating the return.
    pub fn new(vrn: impl Into<String>, body: SubmitVatReturnBody) -> Result<Self, InvalidFieldValue> {
        body.validate()?;
        Ok(Self {
            vrn: Vrn::new(vrn)?,
            body,
            gov_test_scenario: None,
        })
    }

    /// Returns the return being submitted.
    pub fn vat_return(&self) -> &SubmitVatReturnBody {
        &self.body
    }

    /// Sets the sandbox scenario from its code; the request is unchanged on error.
    pub fn set_gov_test_scenario(&mut self, scenario: &str) -> Result<&mut Self, InvalidFieldValue> {
        assign(&mut self.gov_test_scenario, scenario)?;
        Ok(self)
    }

    /// Sets the sandbox scenario.
    #[must_use]
    pub fn with_gov_test_scenario(mut self, scenario: SubmitReturnGovTestScenario) -> Self {
        self.gov_test_scenario = Some(scenario);
        self
    }
}

impl ApiRequest for SubmitVatReturnRequest {
    fn method(&self) -> RequestMethod {
        RequestMethod::Post
    }

    fn path(&self) -> CallPath {
        CallPath::from(vat_path("/returns")).add_param("vrn", self.vrn.as_str())
    }

    fn headers(&self) -> CallHeaders {
        CallHeaders::new().add_optional(GOV_TEST_SCENARIO, self.gov_test_scenario)
    }

    fn body(&self) -> Result<Option<CallBody>, MtdError> {
        CallBody::json(&self.body).map(Some)
    }

    fn validate(&self) -> Result<(), InvalidFieldValue> {
        self.body.validate()
    }
}
