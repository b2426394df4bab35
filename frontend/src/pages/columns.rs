//! Per-resource table layout.

use edu_admin_shared::{AdminEntity, Course, Nft, Quest, User};
use yew::prelude::*;

/// How a resource renders inside the generic admin table.
pub trait TableRow: AdminEntity {
    const TITLE: &'static str;
    const SEARCH_PLACEHOLDER: &'static str;

    /// Headers for the resource-specific columns, between the name and the
    /// dependents count.
    fn headers() -> &'static [&'static str];

    /// Cells matching [`TableRow::headers`].
    fn cells(&self) -> Vec<Html>;

    /// Secondary line under the name.
    fn subtitle(&self) -> Option<String> {
        None
    }
}

fn text(value: &str) -> Html {
    if value.trim().is_empty() {
        html! { <span class="text-[var(--muted)]">{ "-" }</span> }
    } else {
        html! { value.to_string() }
    }
}

impl TableRow for User {
    const SEARCH_PLACEHOLDER: &'static str = "Search by name or email";
    const TITLE: &'static str = "Users";

    fn headers() -> &'static [&'static str] {
        &["Email", "Role"]
    }

    fn cells(&self) -> Vec<Html> {
        vec![text(&self.email), text(&self.role)]
    }
}

impl TableRow for Course {
    const SEARCH_PLACEHOLDER: &'static str = "Search courses";
    const TITLE: &'static str = "Courses";

    fn headers() -> &'static [&'static str] {
        &["Category", "Difficulty"]
    }

    fn cells(&self) -> Vec<Html> {
        vec![text(&self.category), text(&self.difficulty)]
    }

    fn subtitle(&self) -> Option<String> {
        Some(self.description.clone()).filter(|value| !value.is_empty())
    }
}

impl TableRow for Nft {
    const SEARCH_PLACEHOLDER: &'static str = "Search NFTs";
    const TITLE: &'static str = "NFTs";

    fn headers() -> &'static [&'static str] {
        &["Rarity", "Image"]
    }

    fn cells(&self) -> Vec<Html> {
        let image = match self.image_url.as_deref() {
            Some(url) => html! {
                <img src={url.to_string()} alt={self.name.clone()} class="h-10 w-10 rounded-md object-cover" loading="lazy" />
            },
            None => text(""),
        };
        vec![text(&self.rarity), image]
    }
}

impl TableRow for Quest {
    const SEARCH_PLACEHOLDER: &'static str = "Search quests";
    const TITLE: &'static str = "Quests";

    fn headers() -> &'static [&'static str] {
        &["Category", "Difficulty", "Reward"]
    }

    fn cells(&self) -> Vec<Html> {
        vec![
            text(&self.category),
            text(&self.difficulty),
            html! { format!("{} pts", self.reward_points) },
        ]
    }

    fn subtitle(&self) -> Option<String> {
        Some(self.description.clone()).filter(|value| !value.is_empty())
    }
}
