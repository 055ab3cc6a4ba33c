use serde::{Deserialize, Serialize};
use shared::domain::{Sponsor, SponsorId};

const NEW_TAB: &str = "_blank";
const PLACEHOLDER_GLYPH: &str = "image";

/// What fills the top of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardImage {
    Logo { src: String, alt: String },
    Placeholder { glyph: String, caption: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundLink {
    pub label: String,
    pub href: String,
    pub target: String,
}

impl OutboundLink {
    fn new_tab(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
            target: NEW_TAB.to_string(),
        }
    }
}

/// Admin-only control that starts the delete confirmation for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTrigger {
    pub sponsor_id: SponsorId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorCardView {
    pub title: String,
    pub location: String,
    pub badge: String,
    pub image: CardImage,
    pub website: OutboundLink,
    pub map: OutboundLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<DeleteTrigger>,
}

/// One sponsor tile. Image failure is card-local state; the record itself is
/// never touched.
#[derive(Debug, Clone)]
pub struct SponsorCard {
    sponsor: Sponsor,
    admin: bool,
    image_failed: bool,
}

impl SponsorCard {
    pub fn new(sponsor: Sponsor, admin: bool) -> Self {
        Self {
            sponsor,
            admin,
            image_failed: false,
        }
    }

    pub fn sponsor(&self) -> &Sponsor {
        &self.sponsor
    }

    pub fn mark_image_failed(&mut self) {
        self.image_failed = true;
    }

    pub fn render(&self) -> SponsorCardView {
        let sponsor = &self.sponsor;
        let image = if self.image_failed {
            CardImage::Placeholder {
                glyph: PLACEHOLDER_GLYPH.to_string(),
                caption: sponsor.title.clone(),
            }
        } else {
            CardImage::Logo {
                src: sponsor.image.clone(),
                alt: sponsor.title.clone(),
            }
        };
        let delete = match (&sponsor.id, self.admin) {
            (Some(id), true) => Some(DeleteTrigger {
                sponsor_id: id.clone(),
                title: sponsor.title.clone(),
            }),
            _ => None,
        };

        SponsorCardView {
            title: sponsor.title.clone(),
            location: sponsor.location.clone(),
            badge: sponsor.text.clone(),
            image,
            website: OutboundLink::new_tab(&sponsor.title, &sponsor.websitelink),
            map: OutboundLink::new_tab(&sponsor.location, &sponsor.maplink),
            delete,
        }
    }
}

#[cfg(test)]
#[path = "tests/card_tests.rs"]
mod tests;
