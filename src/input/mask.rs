use serde::{Deserialize, Serialize};

/// Maximum digits either mask accepts; extra input is truncated
pub const MAX_DIGITS: usize = 11;

/// Display mask applied to a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaskKind {
    #[default]
    None,
    /// `000.000.000-00`
    Cpf,
    /// `(00) 00000-0000`
    Phone,
}

/// Strip everything but ASCII digits and truncate to the mask's digit limit
pub fn digits_only(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_DIGITS)
        .collect()
}

/// A masked input value: the displayed string plus its mask kind.
///
/// The displayed string always satisfies the mask's partial-progress
/// grammar; punctuation is owned by the mask, digits by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedInput {
    kind: MaskKind,
    value: String,
}

impl MaskedInput {
    pub fn new(kind: MaskKind) -> Self {
        Self {
            kind,
            value: String::new(),
        }
    }

    /// Build from raw text as if it had been typed in one go
    pub fn from_raw(kind: MaskKind, raw: &str) -> Self {
        let mut input = Self::new(kind);
        input.input(raw);
        input
    }

    pub fn kind(&self) -> MaskKind {
        self.kind
    }

    /// Current display value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Digits currently held, without punctuation
    pub fn digits(&self) -> String {
        digits_only(&self.value)
    }

    /// Keystroke path: reformat the whole field from the new raw text
    pub fn input(&mut self, raw: &str) -> &str {
        self.value = match self.kind {
            MaskKind::None => raw.to_string(),
            MaskKind::Cpf => format_cpf(&digits_only(raw)),
            MaskKind::Phone => format_phone(&digits_only(raw)),
        };
        &self.value
    }

    /// Blur path: apply the complete pattern only when the digit count is
    /// exactly complete, otherwise leave the value as typed
    pub fn blur(&mut self) -> &str {
        let digits = self.digits();
        match self.kind {
            MaskKind::None => {}
            MaskKind::Cpf => {
                if digits.len() == 11 {
                    self.value = format_cpf(&digits);
                }
            }
            MaskKind::Phone => {
                // Mobile numbers carry 11 digits, landlines 10; both are
                // complete shapes.
                if digits.len() == 11 || digits.len() == 10 {
                    self.value = format_phone(&digits);
                }
            }
        }
        &self.value
    }
}

/// CPF punctuation by digit-count tier, partial trailing group kept as-is
fn format_cpf(digits: &str) -> String {
    match digits.len() {
        0..=3 => digits.to_string(),
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
    }
}

/// Phone punctuation by digit-count tier; the hyphen shifts once the number
/// grows past landline length
fn format_phone(digits: &str) -> String {
    match digits.len() {
        0 => String::new(),
        1..=2 => format!("({digits}"),
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        7..=10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpf(raw: &str) -> String {
        MaskedInput::from_raw(MaskKind::Cpf, raw).value().to_string()
    }

    fn phone(raw: &str) -> String {
        MaskedInput::from_raw(MaskKind::Phone, raw)
            .value()
            .to_string()
    }

    #[test]
    fn test_cpf_progressive_tiers() {
        assert_eq!(cpf("111"), "111");
        assert_eq!(cpf("111444"), "111.444");
        assert_eq!(cpf("111444777"), "111.444.777");
        assert_eq!(cpf("11144477735"), "111.444.777-35");
    }

    #[test]
    fn test_cpf_partial_trailing_group() {
        assert_eq!(cpf("11144"), "111.44");
        assert_eq!(cpf("1114447"), "111.444.7");
        assert_eq!(cpf("1114447773"), "111.444.777-3");
    }

    #[test]
    fn test_cpf_strips_and_truncates() {
        assert_eq!(cpf("111.444.777-35"), "111.444.777-35");
        assert_eq!(cpf("a1b1c1 444!777@35999"), "111.444.777-35");
        assert_eq!(cpf(""), "");
    }

    #[test]
    fn test_phone_progressive_tiers() {
        assert_eq!(phone(""), "");
        assert_eq!(phone("1"), "(1");
        assert_eq!(phone("11"), "(11");
        assert_eq!(phone("119"), "(11) 9");
        assert_eq!(phone("119888"), "(11) 9888");
        assert_eq!(phone("1198888"), "(11) 9888-8");
        assert_eq!(phone("1198888777"), "(11) 9888-8777");
        assert_eq!(phone("11988887777"), "(11) 98888-7777");
    }

    #[test]
    fn test_phone_reformats_each_keystroke() {
        let mut input = MaskedInput::new(MaskKind::Phone);
        input.input("11");
        assert_eq!(input.value(), "(11");
        input.input("(11) 98888-7777extra999");
        assert_eq!(input.value(), "(11) 98888-7777");
        assert_eq!(input.digits(), "11988887777");
    }

    #[test]
    fn test_blur_completes_only_full_lengths() {
        let mut partial = MaskedInput::from_raw(MaskKind::Cpf, "11144");
        partial.blur();
        assert_eq!(partial.value(), "111.44");

        let mut complete = MaskedInput::from_raw(MaskKind::Cpf, "11144477735");
        complete.blur();
        assert_eq!(complete.value(), "111.444.777-35");

        // A 10-digit landline is a complete phone shape on blur.
        let mut landline = MaskedInput::from_raw(MaskKind::Phone, "1133334444");
        landline.blur();
        assert_eq!(landline.value(), "(11) 3333-4444");
    }

    #[test]
    fn test_none_mask_passes_through() {
        let mut input = MaskedInput::new(MaskKind::None);
        input.input("anything at all");
        assert_eq!(input.value(), "anything at all");
        input.blur();
        assert_eq!(input.value(), "anything at all");
    }
}
