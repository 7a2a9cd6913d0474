/// Format an amount as whole pesos with thousands separators: $1,234,567
pub fn money(val: f64) -> String {
    let rounded = val.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}")
    } else {
        format!("${with_commas}")
    }
}

pub fn pct(val: f64) -> String {
    if val.fract() == 0.0 {
        format!("{val:.0}%")
    } else {
        format!("{val}%")
    }
}
