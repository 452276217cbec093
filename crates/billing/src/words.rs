//! Amount-in-words rendering for invoices.
//!
//! Amounts are grouped in thousands (Thousand, Million, Billion, ...) and each
//! group is spelled as hundreds, then tens-or-teens, then ones. The thousands
//! count is a full group too, so 10,000 is "Ten Thousand" rather than a
//! single digit lookup.

/// Fixed currency label used on invoices.
pub const CURRENCY: &str = "BDT";

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

const TEENS: [&str; 10] = [
    "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

// u64::MAX has seven thousand-groups.
const SCALES: [&str; 7] = [
    "",
    "Thousand",
    "Million",
    "Billion",
    "Trillion",
    "Quadrillion",
    "Quintillion",
];

/// `"BDT <words> Only"`, e.g. `6000` -> `"BDT Six Thousand Only"`.
pub fn amount_in_words(amount: u64) -> String {
    format!("{CURRENCY} {} Only", spell(amount))
}

/// Words for `amount` without the currency wrapping; `0` is `"Zero"`.
pub fn spell(amount: u64) -> String {
    if amount == 0 {
        return "Zero".to_string();
    }

    let mut groups = Vec::with_capacity(SCALES.len());
    let mut rest = amount;
    while rest > 0 {
        groups.push((rest % 1000) as usize);
        rest /= 1000;
    }

    let mut parts = Vec::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        spell_group(group, &mut parts);
        if scale > 0 {
            parts.push(SCALES[scale]);
        }
    }
    parts.join(" ")
}

fn spell_group(mut n: usize, parts: &mut Vec<&'static str>) {
    if n >= 100 {
        parts.push(ONES[n / 100]);
        parts.push("Hundred");
        n %= 100;
    }
    if n >= 20 {
        parts.push(TENS[n / 10]);
        n %= 10;
    } else if n >= 10 {
        parts.push(TEENS[n - 10]);
        n = 0;
    }
    if n > 0 {
        parts.push(ONES[n]);
    }
}
