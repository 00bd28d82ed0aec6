use rand::Rng;
use crate::models::BotReply;

/// A canned reply with its follow-up chips.
#[derive(Debug)]
pub struct CannedReply {
    pub text: &'static str,
    pub suggestions: [&'static str; 3],
}

impl CannedReply {
    fn to_reply(&self) -> BotReply {
        BotReply {
            text: self.text.to_string(),
            suggestions: Some(self.suggestions.iter().map(|s| s.to_string()).collect()),
            metadata: None,
        }
    }
}

#[derive(Debug)]
pub struct KeywordRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub reply: CannedReply,
}

impl KeywordRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Evaluated in order; the first rule with a matching keyword wins.
pub static RULES: [KeywordRule; 6] = [
    KeywordRule {
        name: "hours",
        keywords: &["opening hours", "hours"],
        reply: CannedReply {
            text: "Our facilities are open 24/7! The main reception is always available, while specific amenities have the following hours:\n\n\u{1F3CA} Pool & Spa: 6:00 AM - 10:00 PM\n\u{1F37D}\u{FE0F} Restaurant: 7:00 AM - 11:00 PM\n\u{1F3CB}\u{FE0F} Fitness Center: 5:00 AM - 11:00 PM\n\nIs there a specific facility you'd like to know about?",
            suggestions: ["Pool Hours", "Restaurant Menu", "Gym Access"],
        },
    },
    KeywordRule {
        name: "booking",
        keywords: &["book", "booking", "reservation"],
        reply: CannedReply {
            text: "I'd be happy to help you with your booking! We offer several accommodation options:\n\n\u{1F3E8} Executive Suites - From \u{20A6}45,000/night\n\u{1F3D6}\u{FE0F} Ocean View Rooms - From \u{20A6}35,000/night\n\u{1F31F} Standard Rooms - From \u{20A6}25,000/night\n\nAll rooms include complimentary breakfast and WiFi. What dates are you looking at?",
            suggestions: ["Check Availability", "View Packages", "Contact Sales"],
        },
    },
    KeywordRule {
        name: "facilities",
        keywords: &["facilities", "amenities"],
        reply: CannedReply {
            text: "We offer world-class facilities for your comfort:\n\n\u{1F3CA} Olympic-size swimming pool\n\u{1F486} Full-service spa & wellness center\n\u{1F37D}\u{FE0F} 3 restaurants & 2 bars\n\u{1F3CB}\u{FE0F} State-of-the-art fitness center\n\u{1F3BE} Tennis court\n\u{1F697} Complimentary valet parking\n\u{1F3DB}\u{FE0F} Conference rooms & business center\n\nWhich facility interests you most?",
            suggestions: ["Pool & Spa", "Dining Options", "Business Center"],
        },
    },
    KeywordRule {
        name: "complaint",
        keywords: &["complaint", "problem", "issue"],
        reply: CannedReply {
            text: "I'm sorry to hear you're experiencing an issue. Your feedback is very important to us. I can help you:\n\n\u{1F4DD} File a formal complaint\n\u{1F4DE} Connect you with our manager\n\u{1F4AC} Resolve the issue right now\n\nPlease let me know what happened, and I'll make sure it's addressed promptly.",
            suggestions: ["Speak to Manager", "File Complaint", "Describe Issue"],
        },
    },
    KeywordRule {
        name: "pricing",
        keywords: &["price", "cost", "rate"],
        reply: CannedReply {
            text: "Our competitive rates vary by season and room type:\n\n\u{1F4B0} Standard Rooms: \u{20A6}25,000 - \u{20A6}35,000/night\n\u{2B50} Premium Rooms: \u{20A6}35,000 - \u{20A6}50,000/night\n\u{1F3D6}\u{FE0F} Suites: \u{20A6}50,000 - \u{20A6}85,000/night\n\nPrices include breakfast, WiFi, and access to all facilities. We often have special packages and discounts available!",
            suggestions: ["View Packages", "Special Offers", "Group Discounts"],
        },
    },
    KeywordRule {
        name: "location",
        keywords: &["location", "address", "where"],
        reply: CannedReply {
            text: "\u{1F30D} We're located in the heart of Victoria Island, Lagos:\n\n\u{1F4CD} 123 Landmark Boulevard, Victoria Island, Lagos, Nigeria\n\u{1F697} 5 minutes from Murtala Muhammed Airport\n\u{1F3E2} Walking distance to major business districts\n\u{1F6CD}\u{FE0F} Close to shopping malls and entertainment\n\nWould you like directions or transport information?",
            suggestions: ["Get Directions", "Airport Shuttle", "Nearby Attractions"],
        },
    },
];

/// Used when no rule matches; one is picked uniformly at random.
pub static GENERAL_REPLIES: [CannedReply; 4] = [
    CannedReply {
        text: "Thank you for your message! I'm here to help you with any questions about our services, bookings, or facilities. What would you like to know?",
        suggestions: ["Room Booking", "Facilities Info", "Contact Details"],
    },
    CannedReply {
        text: "I'd be happy to assist you today! Whether you need help with reservations, information about our amenities, or have any concerns, I'm here for you.",
        suggestions: ["Make Reservation", "View Amenities", "Customer Support"],
    },
    CannedReply {
        text: "Great to hear from you! How can I make your Landmark Africa experience exceptional today?",
        suggestions: ["Book a Room", "Dining Options", "Special Requests"],
    },
    CannedReply {
        text: "Welcome! I'm your personal assistant for all things related to Landmark Africa. What can I help you with?",
        suggestions: ["Accommodation", "Services", "Local Information"],
    },
];

/// Offline keyword responder standing in for the backend in demo mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseGenerator;

impl ResponseGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn matching_rule(&self, utterance: &str) -> Option<&'static KeywordRule> {
        let lowered = utterance.to_lowercase();
        RULES.iter().find(|rule| rule.matches(&lowered))
    }

    pub fn respond(&self, utterance: &str) -> BotReply {
        self.respond_with(utterance, &mut rand::thread_rng())
    }

    pub fn respond_with<R: Rng + ?Sized>(&self, utterance: &str, rng: &mut R) -> BotReply {
        match self.matching_rule(utterance) {
            Some(rule) => rule.reply.to_reply(),
            None => GENERAL_REPLIES[rng.gen_range(0..GENERAL_REPLIES.len())].to_reply(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn suggestions(reply: &BotReply) -> Vec<&str> {
        reply.suggestions.as_ref().unwrap().iter().map(String::as_str).collect()
    }

    #[test]
    fn opening_hours_reply() {
        let reply = ResponseGenerator::new().respond("What are your opening hours?");
        assert!(reply.text.contains("24/7"));
        assert_eq!(suggestions(&reply), vec!["Pool Hours", "Restaurant Menu", "Gym Access"]);
    }

    #[test]
    fn booking_reply() {
        let reply = ResponseGenerator::new().respond("I'd like to book a room");
        assert!(reply.text.contains("Executive Suites"));
        assert_eq!(suggestions(&reply), vec!["Check Availability", "View Packages", "Contact Sales"]);
    }

    #[test]
    fn matching_ignores_case() {
        let generator = ResponseGenerator::new();
        assert_eq!(generator.matching_rule("WHERE are you?").map(|r| r.name), Some("location"));
        assert_eq!(generator.matching_rule("Any Amenities?").map(|r| r.name), Some("facilities"));
    }

    #[test]
    fn first_rule_wins() {
        // mentions both hours and booking; hours is evaluated first
        let generator = ResponseGenerator::new();
        assert_eq!(generator.matching_rule("book spa hours").map(|r| r.name), Some("hours"));
        assert_eq!(generator.matching_rule("price of a reservation").map(|r| r.name), Some("booking"));
    }

    #[test]
    fn every_rule_has_three_chips() {
        for rule in RULES.iter() {
            assert_eq!(rule.reply.suggestions.len(), 3, "rule {}", rule.name);
            assert!(rule.reply.to_reply().metadata.is_none());
        }
    }

    #[test]
    fn unmatched_input_picks_generic_templates_uniformly() {
        let generator = ResponseGenerator::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 4];
        let trials = 4000;

        for _ in 0..trials {
            let reply = generator.respond_with("hello there", &mut rng);
            let idx = GENERAL_REPLIES
                .iter()
                .position(|t| t.text == reply.text)
                .expect("reply must be one of the generic templates");
            assert_eq!(reply.suggestions.as_ref().map(Vec::len), Some(3));
            counts[idx] += 1;
        }

        for count in counts {
            assert!(count > 800 && count < 1200, "skewed distribution: {:?}", counts);
        }
    }
}
