use coinvest_db::state::OTP_VALIDITY_MINUTES;
use coinvest_mailer::OtpMail;
use rand::Rng;

/// Number of decimal digits in a generated code
pub const OTP_LENGTH: usize = 6;

pub const WITHDRAWAL_OTP_SUBJECT: &str = "Withdrawal OTP";

/// Source of one-time codes
pub trait OtpGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniformly random zero padded decimal codes
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomOtpGenerator;

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self) -> String {
        let upper = 10u32.pow(OTP_LENGTH as u32);
        let code = rand::thread_rng().gen_range(0..upper);
        format!("{:0width$}", code, width = OTP_LENGTH)
    }
}

/// Letter that delivers a withdrawal code
pub fn withdrawal_otp_mail(email: &str, code: &str) -> OtpMail {
    OtpMail {
        email: email.to_owned(),
        otp: code.to_owned(),
        subject: WITHDRAWAL_OTP_SUBJECT.to_owned(),
        message: format!(
            "Your OTP for withdrawal is {code}. It is valid for {OTP_VALIDITY_MINUTES} minutes."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_codes_shape() {
        let generator = RandomOtpGenerator;
        for _ in 0..100 {
            let code = generator.generate();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_mail_template() {
        let mail = withdrawal_otp_mail("u1@x.com", "042042");
        assert_eq!(mail.email, "u1@x.com");
        assert_eq!(mail.otp, "042042");
        assert_eq!(mail.subject, "Withdrawal OTP");
        assert_eq!(
            mail.message,
            "Your OTP for withdrawal is 042042. It is valid for 5 minutes."
        );
    }
}
