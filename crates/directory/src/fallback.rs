use shared::domain::Sponsor;

struct DefaultSponsor {
    image: &'static str,
    title: &'static str,
    location: &'static str,
    maplink: &'static str,
    text: &'static str,
    websitelink: &'static str,
}

const DEFAULT_SPONSORS: [DefaultSponsor; 5] = [
    DefaultSponsor {
        image: "/assets/sponsors/seoulful.png",
        title: "Seoulful Convenience",
        location: "1619 Ellis St",
        maplink: "https://www.google.ca/maps/place/Seoulful+Convenience/@49.885116,-119.4959369,17z/data=!3m1!4b1!4m6!3m5!1s0x537df52e4a80e70f:0x77812feb6aba0273!8m2!3d49.8851126!4d-119.493362!16s%2Fg%2F11lnhlpht6?entry=ttu&g_ep=EgoyMDI0MTExMC4wIKXMDSoASAFQAw%3D%3D",
        text: "5% off for KDT members!",
        websitelink: "https://seoulfulconvenience.ca",
    },
    DefaultSponsor {
        image: "/assets/sponsors/macaoimperialtea.png",
        title: "Macao Imperial Tea",
        location: "590 Hwy 33 W #23",
        maplink: "https://www.google.ca/maps/place/Macao+Imperial+Tea/@49.8896423,-119.4000558,17z/data=!3m2!4b1!5s0x537d8d254aed5519:0xcfc309a147be2f5b!4m6!3m5!1s0x537d8de1f6a33909:0x884826c2eda55afd!8m2!3d49.8896389!4d-119.3974809!16s%2Fg%2F11tjx7cm31?entry=ttu&g_ep=EgoyMDI0MTAxNC4wIKXMDSoASAFQAw%3D%3D",
        text: "15% off for KDT members!",
        websitelink: "https://www.macaoimperialteacanada.com/",
    },
    DefaultSponsor {
        image: "/assets/sponsors/tossingpizzeria.jpeg",
        title: "Tossing Pizzeria",
        location: "975 Academy Way #120",
        maplink: "https://www.google.ca/maps/place/Tossing+Pizzeria/@49.9350734,-119.4035122,17z/data=!3m1!4b1!4m6!3m5!1s0x537d8d9a4dffe3cf:0xf3f5a3a909ce0167!8m2!3d49.93507!4d-119.3986413!16s%2Fg%2F11hnt50t51?entry=ttu&g_ep=EgoyMDI0MTAxNC4wIKXMDSoASAFQAw%3D%3D",
        text: "15% off for KDT members!",
        websitelink: "https://www.tossingpizzeria.com/",
    },
    DefaultSponsor {
        image: "/assets/sponsors/bubblewaffle.png",
        title: "Bubble Waffle Cafe",
        location: "5538 Airport Way #102",
        maplink: "https://www.google.ca/maps/place/%E9%B8%A1%E8%9B%8B%E4%BB%94+Bubble+Waffle+Cafe+(Chinese+Restaurant)/@49.9508013,-119.3867347,17z/data=!3m2!4b1!5s0x537ded77da6dd3e9:0x1754ea70f96d416c!4m6!3m5!1s0x537ded5b5af637c7:0x58f6b1e233da392!8m2!3d49.9507979!4d-119.3841598!16s%2Fg%2F11v3yzttsy?entry=ttu&g_ep=EgoyMDI0MTAxNC4wIKXMDSoASAFQAw%3D%3D",
        text: "12% off for KDT members!",
        websitelink: "https://www.bubblewafflecafe.ca/",
    },
    DefaultSponsor {
        image: "/assets/sponsors/formosa.png",
        title: "Formosa Tea Cafe",
        location: "1970 Kane Rd Unit 210",
        maplink: "https://www.google.ca/maps/place/Formosa+Tea+Cafe+-+Glenmore+Location+(Bubble+Tea)/@49.9151098,-119.4450163,17z/data=!3m1!4b1!4m6!3m5!1s0x537df363e212f627:0x6cc37747be5faec5!8m2!3d49.9151064!4d-119.4424414!16s%2Fg%2F11tdbmlwh7?entry=ttu&g_ep=EgoyMDI0MTAxNC4wIKXMDSoASAFQAw%3D%3D",
        text: "10% off for KDT members!",
        websitelink: "https://www.formosateacafe.ca/",
    },
];

/// The five long-standing sponsors shown whenever the store is empty or
/// unreachable. None of them carries an id, so none can be deleted.
pub fn default_sponsors() -> Vec<Sponsor> {
    DEFAULT_SPONSORS
        .iter()
        .map(|d| Sponsor {
            id: None,
            title: d.title.to_string(),
            image: d.image.to_string(),
            location: d.location.to_string(),
            maplink: d.maplink.to_string(),
            text: d.text.to_string(),
            websitelink: d.websitelink.to_string(),
            created_at: None,
        })
        .collect()
}
