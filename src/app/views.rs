//! The application's concrete views.

use std::rc::Rc;

use serde_json::json;

use super::router::Route;
use super::state::{IssueDetail, IssuesState};
use crate::dom::Element;
use crate::errors::ViewError;
use crate::events::EventKind;
use crate::model::Model;
use crate::view::{
    ActionItem, CollectionView, ItemFactory, View, ViewAction, ViewContext, ViewNode, weak_callback,
};

/// One row of the issue list. Selecting it opens the issue.
pub struct IssueItemView {
    node: ViewNode,
    model: Model,
}

impl IssueItemView {
    pub fn new(model: &Model, context: &ViewContext) -> Rc<Self> {
        Rc::new(Self {
            node: ViewNode::new("li", Some("issue-item-renderer"), context.clone()),
            model: model.clone(),
        })
    }

    pub fn factory() -> ItemFactory {
        Rc::new(|model: &Model, context: &ViewContext| -> Rc<dyn View> {
            IssueItemView::new(model, context)
        })
    }

    fn number(&self) -> Option<u64> {
        self.model.get("number").and_then(|n| n.as_u64())
    }
}

impl View for IssueItemView {
    fn node(&self) -> &ViewNode {
        &self.node
    }

    fn render(&self) -> Result<(), ViewError> {
        self.node.render_model(Some(&self.model))
    }

    fn handle(&self, action: &ViewAction) -> bool {
        match (action, self.number()) {
            (ViewAction::Select { number }, Some(own)) if *number == own => {
                let route = Route::Issue {
                    id: own.to_string(),
                };
                self.node.context().navigator.navigate(route.fragment());
                true
            }
            _ => false,
        }
    }

    fn actions(&self) -> Vec<ActionItem> {
        let Some(number) = self.number() else {
            return Vec::new();
        };
        let title = self.model.get_str("title").unwrap_or_default();
        vec![ActionItem::new(
            format!("#{} {}", number, title),
            ViewAction::Select { number },
        )]
    }
}

/// One comment under an issue.
pub struct CommentItemView {
    node: ViewNode,
    model: Model,
}

impl CommentItemView {
    pub fn new(model: &Model, context: &ViewContext) -> Rc<Self> {
        Rc::new(Self {
            node: ViewNode::new("li", Some("comment-item-renderer"), context.clone()),
            model: model.clone(),
        })
    }

    pub fn factory() -> ItemFactory {
        Rc::new(|model: &Model, context: &ViewContext| -> Rc<dyn View> {
            CommentItemView::new(model, context)
        })
    }
}

impl View for CommentItemView {
    fn node(&self) -> &ViewNode {
        &self.node
    }

    fn render(&self) -> Result<(), ViewError> {
        self.node.render_model(Some(&self.model))
    }
}

/// Paginated issue list: header, previous/next controls and the list.
pub struct IssuesView {
    node: ViewNode,
    state: IssuesState,
    pagination: Element,
}

impl IssuesView {
    pub fn new(state: IssuesState, context: ViewContext) -> Rc<Self> {
        let view = Rc::new(Self {
            node: ViewNode::new("div", Some("issues-view"), context),
            state,
            pagination: Element::new("nav").with_attribute("class", "pagination"),
        });
        let events = view.state.issues.events().clone();
        view.node.bind(
            &events,
            EventKind::Reset,
            weak_callback(&view, |v, _| v.update_navigation()),
        );
        view
    }

    pub fn state(&self) -> &IssuesState {
        &self.state
    }

    /// Re-render the previous/next controls from the latest page links.
    pub fn update_navigation(&self) -> Result<(), ViewError> {
        let links = self.state.issues.links();
        let markup = self.node.context().templates.render(
            "pagination",
            &json!({ "prev": links.page("prev"), "next": links.page("next") }),
        )?;
        self.pagination.set_markup(markup);
        Ok(())
    }

    fn go_to(&self, rel: &str) -> bool {
        match self.state.issues.links().page(rel) {
            Some(page) => {
                let route = Route::Issues {
                    page: page.to_string(),
                };
                self.node.context().navigator.navigate(route.fragment());
                true
            }
            None => {
                tracing::debug!(rel, "Pagination direction unavailable");
                false
            }
        }
    }
}

impl View for IssuesView {
    fn node(&self) -> &ViewNode {
        &self.node
    }

    fn render(&self) -> Result<(), ViewError> {
        self.node.render_model(Some(&self.state.model))?;
        self.node.element().set_region("pagination", &self.pagination);
        self.update_navigation()?;

        let list = CollectionView::new(
            self.state.issues.clone(),
            "ul",
            "issues",
            self.node.context().clone(),
            IssueItemView::factory(),
        );
        list.render()?;
        self.node.element().set_region("results", &list.element());
        self.node.set_child("issues_list", list);
        Ok(())
    }

    fn handle(&self, action: &ViewAction) -> bool {
        match action {
            ViewAction::Previous => self.go_to("prev"),
            ViewAction::Next => self.go_to("next"),
            other => self.node.forward(other),
        }
    }

    fn actions(&self) -> Vec<ActionItem> {
        let links = self.state.issues.links();
        let mut actions = Vec::new();
        if let Some(page) = links.page("prev") {
            actions.push(ActionItem::new(format!("Previous page ({})", page), ViewAction::Previous));
        }
        if let Some(page) = links.page("next") {
            actions.push(ActionItem::new(format!("Next page ({})", page), ViewAction::Next));
        }
        actions.extend(self.node.child_actions());
        actions
    }
}

/// Issue detail with its comments. Re-renders whenever the issue changes.
pub struct IssueView {
    node: ViewNode,
    detail: IssueDetail,
}

impl IssueView {
    pub fn new(detail: IssueDetail, context: ViewContext) -> Rc<Self> {
        let view = Rc::new(Self {
            node: ViewNode::new("div", Some("issue-view"), context),
            detail,
        });
        let events = view.detail.model.events().clone();
        view.node
            .bind(&events, EventKind::Change, weak_callback(&view, |v, _| v.render()));
        view
    }

    pub fn detail(&self) -> &IssueDetail {
        &self.detail
    }
}

impl View for IssueView {
    fn node(&self) -> &ViewNode {
        &self.node
    }

    fn render(&self) -> Result<(), ViewError> {
        self.node.render_model(Some(&self.detail.model))?;

        let list = CollectionView::new(
            self.detail.comments.clone(),
            "ul",
            "comments",
            self.node.context().clone(),
            CommentItemView::factory(),
        );
        list.render()?;
        self.node.element().set_region("comments", &list.element());
        self.node.set_child("comments_list", list);
        Ok(())
    }

    fn handle(&self, action: &ViewAction) -> bool {
        match action {
            ViewAction::Back => {
                self.node.context().navigator.back();
                true
            }
            other => self.node.forward(other),
        }
    }

    fn actions(&self) -> Vec<ActionItem> {
        let mut actions = vec![ActionItem::new("Back", ViewAction::Back)];
        actions.extend(self.node.child_actions());
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Fetcher;
    use crate::fetch::testing::RecordingTransport;
    use crate::links::LinkEntry;
    use crate::model::attributes;
    use crate::navigation::{NavigationRequest, Navigator};
    use crate::service::{ServiceConfig, ServiceResource};
    use crate::template::Templates;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn context() -> (ViewContext, UnboundedReceiver<NavigationRequest>) {
        let (navigator, rx) = Navigator::channel();
        let context = ViewContext {
            templates: Rc::new(Templates::load().unwrap()),
            navigator,
        };
        (context, rx)
    }

    fn fetcher() -> Fetcher {
        Fetcher::new(ServiceConfig::default(), Rc::new(RecordingTransport::new()))
    }

    fn issue(number: u64, title: &str) -> Model {
        Model::new(attributes(json!({
            "number": number,
            "title": title,
            "body": "Something is off with the router",
            "user": {"login": "octocat"},
            "created_at": "2024-01-02T10:00:00Z",
            "comments": 2
        })))
    }

    #[test]
    fn test_issue_item_renders_fields() {
        let (context, _rx) = context();
        let item = IssueItemView::new(&issue(7, "Crash"), &context);
        item.render().unwrap();
        let html = item.element().outer_html();

        assert!(html.starts_with("<li>"));
        assert!(html.contains("href=\"#issue/7\""));
        assert!(html.contains("Crash"));
        assert!(html.contains("octocat"));
        assert!(html.contains("Jan 2, 2024"));
        assert!(html.contains("2 comments"));
    }

    #[test]
    fn test_issue_item_select_navigates() {
        let (context, mut rx) = context();
        let item = IssueItemView::new(&issue(7, "Crash"), &context);

        assert!(!item.handle(&ViewAction::Select { number: 8 }));
        assert!(item.handle(&ViewAction::Select { number: 7 }));
        assert_eq!(
            rx.try_recv().unwrap(),
            NavigationRequest::Navigate("issue/7".to_string())
        );
        assert_eq!(
            item.actions(),
            vec![ActionItem::new("#7 Crash", ViewAction::Select { number: 7 })]
        );
    }

    #[test]
    fn test_issues_view_renders_list_on_reset() {
        let (context, _rx) = context();
        let state = IssuesState::new(Some("2"), &fetcher());
        let view = IssuesView::new(state.clone(), context);
        view.render().unwrap();

        let html = view.element().outer_html();
        assert!(html.contains("Page 2"));
        assert!(html.contains(r#"<ul class="issues"></ul>"#));
        assert!(html.contains("prevButton\" class=\"button disabled\""));

        state.issues.reset(vec![issue(1, "First"), issue(2, "Second")]);

        let html = view.element().outer_html();
        assert!(html.contains("First"));
        assert!(html.contains("Second"));
        assert!(html.find("First").unwrap() < html.find("Second").unwrap());
    }

    #[test]
    fn test_issues_view_pagination_controls() {
        let (context, mut rx) = context();
        let state = IssuesState::new(Some("2"), &fetcher());
        let view = IssuesView::new(state.clone(), context);
        view.render().unwrap();

        assert!(!view.handle(&ViewAction::Next));

        state.issues.parse(crate::links::ServiceResponse::new(json!([])).with_links(vec![
            LinkEntry::new("https://x/issues?page=3", "next"),
            LinkEntry::new("https://x/issues?page=1", "prev"),
        ]));
        state.issues.reset(vec![issue(5, "Five")]);

        let html = view.element().outer_html();
        assert!(html.contains("href=\"#issues/3\""));
        assert!(html.contains("href=\"#issues/1\""));
        assert!(!html.contains("disabled"));

        assert!(view.handle(&ViewAction::Next));
        assert_eq!(
            rx.try_recv().unwrap(),
            NavigationRequest::Navigate("issues/3".to_string())
        );
        assert!(view.handle(&ViewAction::Previous));
        assert_eq!(
            rx.try_recv().unwrap(),
            NavigationRequest::Navigate("issues/1".to_string())
        );

        assert!(view.handle(&ViewAction::Select { number: 5 }));
        assert_eq!(
            rx.try_recv().unwrap(),
            NavigationRequest::Navigate("issue/5".to_string())
        );

        let labels: Vec<String> = view.actions().into_iter().map(|a| a.label).collect();
        assert_eq!(labels, vec!["Previous page (1)", "Next page (3)", "#5 Five"]);
    }

    #[test]
    fn test_issue_view_rerenders_on_change_and_disposes_old_list() {
        let (context, _rx) = context();
        let fetcher = fetcher();
        let detail = IssueDetail::new("9", &fetcher);
        let view = IssueView::new(detail.clone(), context);
        view.render().unwrap();
        assert_eq!(detail.comments.events().listener_count(), 3);

        detail.model.set(attributes(json!({
            "number": 9,
            "title": "Routing bug",
            "body": "Hi @tenderlove",
            "state": "open",
            "user": {"login": "octocat"}
        })));

        let html = view.element().outer_html();
        assert!(html.contains("Routing bug"));
        assert!(html.contains("https://github.com/tenderlove"));
        // The replaced comments list let go of the collection.
        assert_eq!(detail.comments.events().listener_count(), 3);

        detail.comments.reset(vec![Model::new(attributes(json!({
            "body": "Confirmed",
            "user": {"login": "reviewer"}
        })))]);
        assert!(view.element().outer_html().contains("Confirmed"));
    }

    #[test]
    fn test_region_marker_in_issue_body_is_not_spliced() {
        let (context, _rx) = context();
        let detail = IssueDetail::new("9", &fetcher());
        let view = IssueView::new(detail.clone(), context);
        view.render().unwrap();

        detail.model.set(attributes(json!({
            "number": 9,
            "title": "Markers",
            "body": "see\n\n<!--region:comments-->\n\nend",
            "user": {"login": "octocat"}
        })));
        detail.comments.reset(vec![Model::new(attributes(json!({
            "body": "UNIQUECOMMENT",
            "user": {"login": "reviewer"}
        })))]);

        let html = view.element().outer_html();
        assert_eq!(html.matches("UNIQUECOMMENT").count(), 1);
        assert!(html.contains("&lt;!--region:comments-->"));
    }

    #[test]
    fn test_issue_view_back() {
        let (context, mut rx) = context();
        let detail = IssueDetail::new("9", &fetcher());
        let view = IssueView::new(detail, context);

        assert!(view.handle(&ViewAction::Back));
        assert_eq!(rx.try_recv().unwrap(), NavigationRequest::Back);
        assert_eq!(view.actions()[0].action, ViewAction::Back);
    }

    #[test]
    fn test_dispose_releases_all_sources() {
        let (context, _rx) = context();
        let detail = IssueDetail::new("9", &fetcher());
        let view = IssueView::new(detail.clone(), context);
        view.render().unwrap();
        detail.comments.reset(vec![issue(1, "c")]);
        let comment = detail.comments.members()[0].clone();

        view.dispose();

        assert_eq!(detail.model.events().listener_count(), 0);
        assert_eq!(detail.comments.events().listener_count(), 0);
        assert_eq!(comment.events().listener_count(), 0);
        assert_eq!(view.element().inner_html(), "");
    }
}
