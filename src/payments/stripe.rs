use async_trait::async_trait;
use stripe::{
    Client, CreatePaymentIntentAutomaticPaymentMethods, Currency, Metadata,
    PaymentIntent as StripePaymentIntent, PaymentIntentId, StripeError,
};

use super::{
    CreatePaymentIntent, METADATA_COURSE_ID, METADATA_USER_ID, PaymentError, PaymentGateway,
    PaymentIntent, PaymentResult, is_payment_intent_id,
};

/// Stripe payment intents through `async-stripe`.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: &str) -> Self {
        Self {
            client: Client::from_url(api_base, secret_key),
        }
    }
}

fn parse_currency(code: &str) -> PaymentResult<Currency> {
    let code = code.trim().to_ascii_lowercase();
    serde_json::from_value(serde_json::Value::String(code.clone()))
        .map_err(|_| PaymentError::InvalidRequest(format!("unsupported currency {code}")))
}

fn parse_intent_id(id: &str) -> PaymentResult<PaymentIntentId> {
    if !is_payment_intent_id(id) {
        return Err(PaymentError::InvalidRequest("malformed payment intent id".into()));
    }
    id.parse::<PaymentIntentId>()
        .map_err(|_| PaymentError::InvalidRequest("malformed payment intent id".into()))
}

fn intent_metadata(params: &CreatePaymentIntent) -> Metadata {
    Metadata::from([
        (METADATA_USER_ID.to_string(), params.user_id.to_string()),
        (METADATA_COURSE_ID.to_string(), params.course_id.to_string()),
    ])
}

fn create_params(
    params: &CreatePaymentIntent,
) -> PaymentResult<stripe::CreatePaymentIntent<'static>> {
    let currency = parse_currency(&params.currency)?;
    let mut create = stripe::CreatePaymentIntent::new(params.amount, currency);
    create.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
        enabled: true,
        ..Default::default()
    });
    create.metadata = Some(intent_metadata(params));
    Ok(create)
}

fn from_stripe(intent: StripePaymentIntent) -> PaymentIntent {
    PaymentIntent {
        id: intent.id.to_string(),
        client_secret: intent.client_secret,
        amount: intent.amount,
        currency: intent.currency.to_string(),
        status: intent.status.as_str().to_string(),
        metadata: intent.metadata,
    }
}

impl From<StripeError> for PaymentError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Stripe(request) => {
                let status = request.http_status;
                PaymentError::Provider {
                    status,
                    message: request
                        .message
                        .unwrap_or_else(|| format!("payment provider returned {status}")),
                }
            }
            other => PaymentError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        params: CreatePaymentIntent,
    ) -> PaymentResult<PaymentIntent> {
        let create = create_params(&params)?;
        let intent = from_stripe(StripePaymentIntent::create(&self.client, create).await?);
        tracing::debug!(
            payment_intent_id = %intent.id,
            amount = intent.amount,
            "payment intent created"
        );
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> PaymentResult<PaymentIntent> {
        let id = parse_intent_id(id)?;
        let intent = StripePaymentIntent::retrieve(&self.client, &id, &[]).await?;
        Ok(from_stripe(intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stripe::RequestError;
    use uuid::Uuid;

    fn request_error(status: u16, body: &str) -> StripeError {
        let mut request: RequestError = serde_json::from_str(body).expect("request error");
        request.http_status = status;
        StripeError::Stripe(request)
    }

    #[test]
    fn create_params_carry_amount_currency_and_metadata() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let params = CreatePaymentIntent {
            amount: 89900,
            currency: "INR".into(),
            user_id,
            course_id,
        };
        let create = create_params(&params).expect("params");
        assert_eq!(create.amount, 89900);
        assert_eq!(create.currency, Currency::INR);
        assert!(create.automatic_payment_methods.expect("methods").enabled);

        let metadata = create.metadata.expect("metadata");
        assert_eq!(metadata.get("userId"), Some(&user_id.to_string()));
        assert_eq!(metadata.get("courseId"), Some(&course_id.to_string()));
    }

    #[test]
    fn unknown_currencies_are_rejected_locally() {
        assert!(matches!(
            parse_currency("ZZZ"),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert_eq!(parse_currency(" usd ").expect("usd"), Currency::USD);
    }

    #[test]
    fn only_well_formed_intent_ids_reach_the_provider() {
        assert_eq!(
            parse_intent_id("pi_3MtwBwLkdIwHu7ix28a3tqPa")
                .expect("id")
                .as_str(),
            "pi_3MtwBwLkdIwHu7ix28a3tqPa"
        );
        for raw in [
            "../customers/cus_123?expand[]=sources",
            "pi_1/../../customers/cus_123",
            "cus_123",
            "pi_",
        ] {
            assert!(
                matches!(parse_intent_id(raw), Err(PaymentError::InvalidRequest(_))),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn surfaces_the_provider_error_message() {
        let err: PaymentError = request_error(
            404,
            r#"{"type": "invalid_request_error", "message": "No such payment_intent: 'pi_x'"}"#,
        )
        .into();
        assert_eq!(err.to_string(), "No such payment_intent: 'pi_x'");
        assert!(matches!(err, PaymentError::Provider { status: 404, .. }));
    }

    #[test]
    fn falls_back_when_the_error_has_no_message() {
        let err: PaymentError = request_error(502, r#"{"type": "api_error"}"#).into();
        assert_eq!(err.to_string(), "payment provider returned 502");
    }
}
