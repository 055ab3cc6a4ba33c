use serde::{Deserialize, Serialize};

use crate::{AuthContext, ListSource, SponsorCard, SponsorCardView, SponsorListSnapshot};

/// Everything the sponsors page needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorsPageView {
    pub loading: bool,
    pub source: ListSource,
    pub show_add_button: bool,
    pub cards: Vec<SponsorCardView>,
}

impl SponsorsPageView {
    pub fn build(snapshot: &SponsorListSnapshot, auth: &AuthContext) -> Self {
        let admin = auth.is_admin();
        let cards = if snapshot.loading {
            Vec::new()
        } else {
            snapshot
                .sponsors
                .iter()
                .map(|sponsor| SponsorCard::new(sponsor.clone(), admin).render())
                .collect()
        };

        Self {
            loading: snapshot.loading,
            source: snapshot.source,
            show_add_button: admin,
            cards,
        }
    }
}
