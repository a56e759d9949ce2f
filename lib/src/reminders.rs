// lib/src/reminders.rs
//
// Natural-language reminder and notice text. The generator is an external
// black box that returns a string or fails; the payment-reminder flow must
// always complete, so it falls back to a deterministic template.

use async_trait::async_trait;
use tracing::warn;

use models::errors::HostelError;
use models::{Payment, Resident};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, HostelError>;
}

/// generateContent-style HTTP backend.
pub struct HttpTextGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpTextGenerator {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        HttpTextGenerator {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, HostelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 256 }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HostelError::Generation(format!("text API request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(HostelError::Generation(format!(
                "text API returned {}",
                response.status()
            )));
        }
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HostelError::Generation(format!("text API response unreadable: {}", e)))?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| HostelError::Generation("text API returned no text".to_string()))
    }
}

/// Indian digit grouping: last three digits, then pairs (12,34,567).
pub fn format_inr(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn notice_prompt(hostel_name: &str, keywords: &str) -> String {
    format!(
        "Generate a concise, friendly, and well-formatted notice for a ladies' hostel \
         notice board based on the following keywords. The hostel is named '{}'. The \
         notice should be clear and easy to read. Keywords: \"{}\"",
        hostel_name, keywords
    )
}

pub fn payment_reminder_prompt(hostel_name: &str, resident: &Resident, payment: &Payment) -> String {
    format!(
        "Generate a polite but firm reminder message for a resident of '{}' about an \
         overdue rent payment, suitable for SMS or a short email. Resident Name: {}. \
         Overdue Amount: \u{20B9}{}. Original Due Date: {}. The tone should be \
         professional and courteous, but make it clear that the payment is now overdue \
         and requires prompt attention. Sign off from \"{} Management\".",
        hostel_name,
        resident.name,
        format_inr(payment.amount),
        payment.date.format("%d/%m/%Y"),
        hostel_name
    )
}

/// Deterministic template used whenever generation fails.
pub fn fallback_reminder(hostel_name: &str, resident: &Resident, payment: &Payment) -> String {
    format!(
        "Dear {}, this is a reminder that your payment of \u{20B9}{} was due on {}. \
         Please make the payment at your earliest convenience. Thank you, {} Management.",
        resident.name,
        format_inr(payment.amount),
        payment.date.format("%d/%m/%Y"),
        hostel_name
    )
}

/// Always yields a reminder: the generated text when the service succeeds,
/// the template otherwise. The boolean reports whether the fallback fired.
pub async fn payment_reminder(
    generator: &dyn TextGenerator,
    hostel_name: &str,
    resident: &Resident,
    payment: &Payment,
) -> (String, bool) {
    let prompt = payment_reminder_prompt(hostel_name, resident, payment);
    match generator.generate(&prompt).await {
        Ok(text) => (text, false),
        Err(err) => {
            warn!(%err, resident = resident.id, "reminder generation failed, using template");
            (fallback_reminder(hostel_name, resident, payment), true)
        }
    }
}

/// Notice generation has no fallback; a failure aborts the action.
pub async fn generate_notice(
    generator: &dyn TextGenerator,
    hostel_name: &str,
    keywords: &str,
) -> Result<String, HostelError> {
    generator.generate(&notice_prompt(hostel_name, keywords)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{MealPlan, PaymentStatus, ResidentRole, ResidentStatus, ResidentType};

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, HostelError> {
            Err(HostelError::Generation("quota exhausted".to_string()))
        }
    }

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, HostelError> {
            Ok(self.0.to_string())
        }
    }

    fn sample_resident() -> Resident {
        Resident {
            id: 1,
            account_id: None,
            role: ResidentRole::Resident,
            name: "Asha".to_string(),
            date_of_birth: None,
            resident_type: ResidentType::Student,
            phone: None,
            email: "asha@example.com".to_string(),
            guardian_name: None,
            guardian_phone: None,
            national_id: None,
            cot_id: None,
            rent: 8000,
            deposit_amount: 5000,
            meal_plan: MealPlan::default(),
            status: ResidentStatus::Active,
        }
    }

    fn sample_payment() -> Payment {
        Payment {
            id: 9,
            resident_id: 1,
            amount: 12500,
            date: "2024-03-05".parse().unwrap(),
            status: PaymentStatus::Overdue,
            description: "March rent".to_string(),
        }
    }

    #[test]
    fn should_group_digits_indian_style() {
        assert_eq!(format_inr(500), "500");
        assert_eq!(format_inr(8000), "8,000");
        assert_eq!(format_inr(12500), "12,500");
        assert_eq!(format_inr(1234567), "12,34,567");
        assert_eq!(format_inr(-8000), "-8,000");
    }

    #[tokio::test]
    async fn should_use_generated_text_when_service_succeeds() {
        let (text, fell_back) = payment_reminder(
            &CannedGenerator("Please pay soon."),
            "Good Shepherd Ladies Hostel",
            &sample_resident(),
            &sample_payment(),
        )
        .await;
        assert_eq!(text, "Please pay soon.");
        assert!(!fell_back);
    }

    #[tokio::test]
    async fn should_fall_back_to_template_with_substituted_details() {
        let (text, fell_back) = payment_reminder(
            &FailingGenerator,
            "Good Shepherd Ladies Hostel",
            &sample_resident(),
            &sample_payment(),
        )
        .await;
        assert!(fell_back);
        assert!(text.contains("Dear Asha"));
        assert!(text.contains("\u{20B9}12,500"));
        assert!(text.contains("05/03/2024"));
        assert!(text.contains("Good Shepherd Ladies Hostel Management"));
    }

    #[tokio::test]
    async fn should_propagate_notice_generation_failure() {
        let err = generate_notice(&FailingGenerator, "Hostel", "water maintenance")
            .await
            .unwrap_err();
        assert!(matches!(err, HostelError::Generation(_)));
    }
}
