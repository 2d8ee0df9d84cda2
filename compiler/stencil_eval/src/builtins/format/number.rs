//! Number patterns in the `#,##0.00` style.
//!
//! Supported: digit placeholders `0` and `#`, one grouping separator `,`,
//! the decimal point `.`, `%` and `‰` multipliers, quoted literals and
//! literal prefix/suffix text. Anything after an unquoted `;` (the negative
//! subpattern) is ignored; negatives get a leading `-`. Rounding is
//! half-even.

use bigdecimal::{BigDecimal, RoundingMode};

use super::NumberSymbols;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NumberPattern {
    prefix: String,
    suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: Option<usize>,
    multiplier: u32,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Section {
    Prefix,
    Number,
    Suffix,
}

impl NumberPattern {
    pub(crate) fn parse(pattern: &str) -> Result<Self, String> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut number = String::new();
        let mut multiplier = 1;
        let mut section = Section::Prefix;
        let mut quoted = false;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal(section, &mut prefix, &mut suffix, '\'');
                } else {
                    quoted = !quoted;
                }
                if section == Section::Number {
                    section = Section::Suffix;
                }
                continue;
            }
            if quoted {
                if section == Section::Number {
                    section = Section::Suffix;
                }
                literal(section, &mut prefix, &mut suffix, c);
                continue;
            }
            match c {
                '#' | '0' | ',' | '.' if section != Section::Suffix => {
                    section = Section::Number;
                    number.push(c);
                }
                ';' => break,
                _ => {
                    if section == Section::Number {
                        section = Section::Suffix;
                    }
                    match c {
                        '%' => multiplier = 100,
                        '\u{2030}' => multiplier = 1000,
                        _ => {}
                    }
                    literal(section, &mut prefix, &mut suffix, c);
                }
            }
        }
        if quoted {
            return Err(format!("Unterminated quote in number pattern \"{pattern}\"."));
        }
        if number.is_empty() {
            return Err(format!("Malformed number pattern \"{pattern}\"."));
        }

        let (int_part, frac_part) = number.split_once('.').unwrap_or((&number, ""));
        if frac_part.contains(['.', ',']) {
            return Err(format!("Malformed number pattern \"{pattern}\"."));
        }
        let grouping = int_part
            .rfind(',')
            .map(|i| int_part[i + 1..].len())
            .filter(|&size| size > 0);

        Ok(NumberPattern {
            prefix,
            suffix,
            min_int: int_part.chars().filter(|&c| c == '0').count(),
            min_frac: frac_part.chars().filter(|&c| c == '0').count(),
            max_frac: frac_part.len(),
            grouping,
            multiplier,
        })
    }

    pub(crate) fn format(&self, value: &BigDecimal, symbols: NumberSymbols) -> String {
        let scaled = if self.multiplier == 1 {
            value.clone()
        } else {
            value * BigDecimal::from(self.multiplier)
        };
        let rounded = scaled.with_scale_round(self.max_frac as i64, RoundingMode::HalfEven);
        let (unscaled, _) = rounded.as_bigint_and_exponent();
        let text = unscaled.to_string();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };

        let mut digits = digits.to_owned();
        while digits.len() <= self.max_frac {
            digits.insert(0, '0');
        }
        let split = digits.len() - self.max_frac;
        let (int_digits, frac_digits) = digits.split_at(split);

        let mut int_digits = int_digits.trim_start_matches('0').to_owned();
        while int_digits.len() < self.min_int {
            int_digits.insert(0, '0');
        }
        let mut frac_digits = frac_digits.to_owned();
        while frac_digits.len() > self.min_frac && frac_digits.ends_with('0') {
            frac_digits.pop();
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            int_digits.push('0');
        }

        let is_zero = digits.bytes().all(|b| b == b'0');
        let mut out = String::new();
        if negative && !is_zero {
            out.push('-');
        }
        out.push_str(&self.prefix);
        push_grouped(&mut out, &int_digits, self.grouping, symbols.grouping);
        if !frac_digits.is_empty() {
            out.push(symbols.decimal);
            out.push_str(&frac_digits);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn literal(section: Section, prefix: &mut String, suffix: &mut String, c: char) {
    if section == Section::Prefix {
        prefix.push(c);
    } else {
        suffix.push(c);
    }
}

fn push_grouped(out: &mut String, digits: &str, size: Option<usize>, separator: char) {
    let Some(size) = size else {
        out.push_str(digits);
        return;
    };
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % size == 0 {
            out.push(separator);
        }
        out.push(c);
    }
}
