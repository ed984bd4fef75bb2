// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact deep-link builders (WhatsApp and dialer).

/// Strip spaces, dashes, and parentheses from a phone number.
pub fn clean_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

/// `tel:` link for the platform dialer.
pub fn tel_link(phone: &str) -> String {
    format!("tel:{}", clean_phone(phone))
}

/// WhatsApp deep link with a prefilled squad message.
///
/// The message references the member's shared area when one is known.
pub fn whatsapp_link(phone: &str, name: &str, area: Option<&str>) -> String {
    let mut message = format!("Hi {}! \u{1F44B}", name);

    match area {
        Some(area) => {
            message.push_str(&format!("\n\n\u{1F4CD} I can see you're at {}", area));
            message.push_str("\n\u{1F3AD} How's the carnival going?");
        }
        None => {
            message.push_str("\n\n\u{1F3AD} How's the carnival going?");
            message.push_str("\n\u{1F4CD} Where are you at the moment?");
        }
    }

    message.push_str("\n\n#NottingHillCarnival #CarnivalSquad");

    format!(
        "https://wa.me/{}?text={}",
        clean_phone(phone),
        urlencoding::encode(&message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_phone() {
        assert_eq!(clean_phone("+44 7700 (900) 123"), "+447700900123");
    }

    #[test]
    fn test_whatsapp_link_includes_area() {
        let link = whatsapp_link("+44 7700 900123", "Alex", Some("Portobello Road"));
        assert!(link.starts_with("https://wa.me/+447700900123?text="));
        assert!(link.contains(&*urlencoding::encode("Portobello Road")));
    }

    #[test]
    fn test_tel_link() {
        assert_eq!(tel_link("+44 7700-900123"), "tel:+447700900123");
    }
}
