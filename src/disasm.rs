use std::collections::HashMap;

use crate::decoder::{Decoded, Jump};
use crate::instructions::comp_mnemonic;

pub fn fmt_decoded(d: &Decoded) -> String {
    match *d {
        Decoded::A(v) => format!("@{v}"),
        Decoded::C { comp, dest, jump } => {
            let mut s = String::new();
            if !dest.is_empty() {
                s.push_str(&dest.mnemonic());
                s.push('=');
            }
            s.push_str(comp_mnemonic(comp).unwrap_or("?"));
            if jump != Jump::Never {
                s.push(';');
                s.push_str(jump.mnemonic());
            }
            s
        }
    }
}

/// Like `fmt_decoded`, but an A-instruction whose value is a known ROM label is
/// shown symbolically when the next instruction jumps.
pub fn fmt_with_labels(d: &Decoded, next: Option<&Decoded>, labels: &HashMap<u16, String>) -> String {
    if let (Decoded::A(v), Some(Decoded::C { jump, .. })) = (d, next) {
        if *jump != Jump::Never {
            if let Some(name) = labels.get(v) {
                return format!("@{name}");
            }
        }
    }
    fmt_decoded(d)
}
