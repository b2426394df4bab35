use edu_admin_shared::{Course, Nft, Quest, User};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::{
    components::admin_nav::AdminNav,
    pages::{admin_guard::AdminGuard, not_found::NotFoundPage, resource_page::ResourcePage},
};

#[derive(Routable, Clone, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Root,
    #[at("/admin/users")]
    Users,
    #[at("/admin/courses")]
    Courses,
    #[at("/admin/nfts")]
    Nfts,
    #[at("/admin/quests")]
    Quests,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    let page = match route {
        Route::Root => return html! { <Redirect<Route> to={Route::Users} /> },
        Route::NotFound => return html! { <NotFoundPage /> },
        Route::Users => html! { <ResourcePage<User> /> },
        Route::Courses => html! { <ResourcePage<Course> /> },
        Route::Nfts => html! { <ResourcePage<Nft> /> },
        Route::Quests => html! { <ResourcePage<Quest> /> },
    };
    html! { <AdminGuard>{ page }</AdminGuard> }
}

#[function_component(AppRouter)]
pub fn app_router() -> Html {
    html! {
        <BrowserRouter>
            <div class="flex flex-col bg-[var(--bg)]" style="min-height: 100vh; min-height: 100svh;">
                <AdminNav />
                <div class="flex-1">
                    <Switch<Route> render={switch} />
                </div>
            </div>
        </BrowserRouter>
    }
}
