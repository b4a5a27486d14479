//! Derives page bounds and navigation-link states from a total count and a
//! requested page. Out-of-range pages clamp, they never error.

use serde::Serialize;

/// One navigation target. Disabled links serialize with a `null` page and
/// `disabled: true` so the presentation layer can render them inert.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub page: Option<u64>,
    pub disabled: bool,
}

impl PageLink {
    fn to(page: u64) -> Self {
        Self {
            page: Some(page),
            disabled: false,
        }
    }

    fn off() -> Self {
        Self {
            page: None,
            disabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavLinks {
    pub firstpage: PageLink,
    pub prevpage: PageLink,
    pub nextpage: PageLink,
    pub lastpage: PageLink,
}

/// Resolved pagination state for one listing response. `links` is absent
/// whenever the whole result set fits on a single page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageNav {
    pub size: u64,
    pub page: u64,
    #[serde(rename = "lastPage")]
    pub last_page: u64,
    #[serde(flatten)]
    pub links: Option<NavLinks>,
}

/// Computes the page state for `total_count` items with the given page
/// size. The requested page is clamped into `[0, last_page]`; clamping is
/// idempotent.
pub fn paginate(requested_page: i64, total_count: u64, page_size: u64) -> PageNav {
    if page_size == 0 || total_count <= page_size {
        return PageNav {
            size: total_count,
            page: 0,
            last_page: 0,
            links: None,
        };
    }

    let last_page = total_count.div_ceil(page_size) - 1;
    let page = requested_page.clamp(0, last_page as i64) as u64;

    let links = NavLinks {
        firstpage: if page == 0 { PageLink::off() } else { PageLink::to(0) },
        prevpage: if page == 0 {
            PageLink::off()
        } else {
            PageLink::to(page - 1)
        },
        nextpage: if page == last_page {
            PageLink::off()
        } else {
            PageLink::to(page + 1)
        },
        lastpage: PageLink::to(last_page),
    };

    PageNav {
        size: total_count,
        page,
        last_page,
        links: Some(links),
    }
}

#[cfg(test)]
mod tests {
    use super::{PageLink, paginate};

    #[test]
    fn single_page_produces_no_links() {
        let nav = paginate(0, 12, 30);
        assert_eq!(nav.size, 12);
        assert_eq!(nav.page, 0);
        assert!(nav.links.is_none());

        let boundary = paginate(0, 30, 30);
        assert!(boundary.links.is_none());
    }

    #[test]
    fn clamps_out_of_range_pages() {
        let nav = paginate(10, 90, 30);
        assert_eq!(nav.last_page, 2);
        assert_eq!(nav.page, 2);

        let negative = paginate(-3, 90, 30);
        assert_eq!(negative.page, 0);
    }

    #[test]
    fn clamping_is_idempotent() {
        let once = paginate(10, 90, 30);
        let twice = paginate(once.page as i64, 90, 30);
        assert_eq!(once, twice);
    }

    #[test]
    fn link_states_on_last_page() {
        let nav = paginate(10, 90, 30);
        let links = nav.links.expect("multi-page listing has links");
        assert_eq!(links.firstpage, PageLink::to(0));
        assert_eq!(links.prevpage, PageLink::to(1));
        assert_eq!(links.nextpage, PageLink::off());
        assert_eq!(links.lastpage, PageLink::to(2));
    }

    #[test]
    fn link_states_on_first_page() {
        let nav = paginate(0, 90, 30);
        let links = nav.links.expect("multi-page listing has links");
        assert_eq!(links.firstpage, PageLink::off());
        assert_eq!(links.prevpage, PageLink::off());
        assert_eq!(links.nextpage, PageLink::to(1));
        assert_eq!(links.lastpage, PageLink::to(2));
    }

    #[test]
    fn middle_page_enables_everything() {
        let nav = paginate(1, 90, 30);
        let links = nav.links.expect("multi-page listing has links");
        assert!(!links.firstpage.disabled);
        assert!(!links.prevpage.disabled);
        assert!(!links.nextpage.disabled);
        assert!(!links.lastpage.disabled);
    }
}
