//! crates/kids_learning_core/src/guard.rs
//!
//! The view-routing guard. Re-evaluated after every navigation or session
//! change, it keeps the active role/profile combination on a screen from that
//! role's legal set and redirects (always by path replacement) otherwise.
//!
//! The guard is pure: it reads a snapshot and returns a decision. Applying the
//! decision, and re-running the guard afterwards, is the caller's job.

use crate::domain::{Role, TeacherProfile};
use crate::session::{AppSession, SessionCorrection};
use crate::views::{home_view, is_root_path, RouteTable, View};

/// Screens a parent may reach without an active parent profile.
const PARENT_LOGGED_OUT_VIEWS: &[View] =
    &[View::Login, View::ParentSetup, View::RoleSelection, View::Splash];

/// Screens a parent with no kid profiles may stay on.
const PARENT_NO_KIDS_VIEWS: &[View] = &[
    View::ParentSetup,
    View::AddKid,
    View::Settings,
    View::Chat,
    View::ChatList,
    View::Login,
    View::RoleSelection,
    View::Splash,
];

/// Kid screens a parent is allowed to linger on.
const PARENT_SHARED_KID_VIEWS: &[View] = &[View::Settings, View::Chat, View::ChatList];

/// Screens reachable with no role selected.
const NO_ROLE_VIEWS: &[View] = &[View::RoleSelection, View::Login, View::Splash];

/// Everything the guard looks at in one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub path: &'a str,
    pub session: &'a AppSession,
    /// True while the initial catalog load is still in flight.
    pub loading: bool,
    /// The cached teacher collection, used to resolve the active teacher id.
    pub teachers: &'a [TeacherProfile],
}

/// A forced move to another screen. Redirects always replace the current
/// history entry so back-navigation never lands on an illegal screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: View,
    pub correction: Option<SessionCorrection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The current screen is legal.
    Stay,
    /// Profile data is still loading; decide again once it settles.
    Defer,
    Redirect(Redirect),
}

fn redirect(to: View) -> GuardDecision {
    GuardDecision::Redirect(Redirect {
        to,
        correction: None,
    })
}

fn redirect_with(to: View, correction: SessionCorrection) -> GuardDecision {
    GuardDecision::Redirect(Redirect {
        to,
        correction: Some(correction),
    })
}

/// Evaluates the routing rules against one snapshot.
#[derive(Debug, Clone, Default)]
pub struct RoutingGuard {
    routes: RouteTable,
}

impl RoutingGuard {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn current_view(&self, path: &str) -> View {
        self.routes.view_for_path(path)
    }

    /// Runs the rule cascade in order; the first rule that fires wins.
    pub fn evaluate(&self, ctx: &GuardContext<'_>) -> GuardDecision {
        let view = self.current_view(ctx.path);

        // 1. The root and anything that resolves to Splash land on the
        //    canonical splash path; once there, nothing else applies.
        if is_root_path(ctx.path) || view == View::Splash {
            if self.routes.is_known(ctx.path) {
                return GuardDecision::Stay;
            }
            return redirect(View::Splash);
        }

        // 2. No role yet.
        let role = match ctx.session.role {
            Some(role) => role,
            None => {
                return if NO_ROLE_VIEWS.contains(&view) {
                    GuardDecision::Stay
                } else {
                    redirect(View::RoleSelection)
                };
            }
        };

        if ctx.loading {
            return GuardDecision::Defer;
        }

        match role {
            Role::Kid => self.kid_rules(ctx, view),
            Role::Parent => self.parent_rules(ctx, view),
            Role::Teacher => self.teacher_rules(ctx, view),
            Role::Admin => self.admin_rules(ctx, view),
        }
    }

    fn kid_rules(&self, ctx: &GuardContext<'_>, view: View) -> GuardDecision {
        if ctx.session.active_kid().is_none() {
            return if ctx.session.active_parent().is_some() {
                redirect_with(home_view(Role::Parent), SessionCorrection::DemoteToParent)
            } else {
                redirect_with(View::RoleSelection, SessionCorrection::ClearRole)
            };
        }
        if !view.is_legal_for(Role::Kid) {
            return redirect(View::KidHome);
        }
        GuardDecision::Stay
    }

    fn parent_rules(&self, ctx: &GuardContext<'_>, view: View) -> GuardDecision {
        let parent = match ctx.session.active_parent() {
            Some(parent) => parent,
            None => {
                if PARENT_LOGGED_OUT_VIEWS.contains(&view) {
                    return GuardDecision::Stay;
                }
                return match ctx.session.active_parent_id {
                    Some(_) => redirect_with(View::Login, SessionCorrection::ClearParentProfile),
                    None => redirect(View::Login),
                };
            }
        };

        if view == View::Login {
            return redirect(View::ProfileSelection);
        }

        let has_kids = ctx.session.kids_of(&parent.id).next().is_some();
        if !has_kids && !PARENT_NO_KIDS_VIEWS.contains(&view) {
            return redirect(View::ParentSetup);
        }

        if view.is_legal_for(Role::Kid) && !PARENT_SHARED_KID_VIEWS.contains(&view) {
            return redirect(View::ProfileSelection);
        }

        if !view.is_legal_for(Role::Parent) && view != View::RoleSelection {
            return redirect(View::ProfileSelection);
        }

        GuardDecision::Stay
    }

    fn teacher_rules(&self, ctx: &GuardContext<'_>, view: View) -> GuardDecision {
        let teacher_id = match ctx.session.active_teacher_id.as_deref() {
            Some(id) => id,
            None => {
                return if view.is_entry() {
                    GuardDecision::Stay
                } else {
                    redirect(View::Login)
                };
            }
        };

        if !ctx.teachers.iter().any(|t| t.id == teacher_id) {
            return redirect_with(View::Login, SessionCorrection::ClearTeacherProfile);
        }

        if view == View::Login {
            return redirect(View::TeacherDashboard);
        }

        if !view.is_legal_for(Role::Teacher) && view != View::RoleSelection {
            return redirect(View::TeacherDashboard);
        }

        GuardDecision::Stay
    }

    fn admin_rules(&self, ctx: &GuardContext<'_>, view: View) -> GuardDecision {
        if ctx.session.active_admin().is_none() {
            if view.is_entry() {
                return GuardDecision::Stay;
            }
            return match ctx.session.active_admin_id {
                Some(_) => redirect_with(View::Login, SessionCorrection::ClearAdminProfile),
                None => redirect(View::Login),
            };
        }

        if view == View::Login || !view.is_legal_for(Role::Admin) {
            return redirect(View::AdminDashboard);
        }

        GuardDecision::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdminProfile, ParentProfile, VerificationStatus};

    fn guard() -> RoutingGuard {
        RoutingGuard::new(RouteTable::new())
    }

    fn eval(session: &AppSession, path: &str) -> GuardDecision {
        guard().evaluate(&GuardContext {
            path,
            session,
            loading: false,
            teachers: &[],
        })
    }

    fn to(view: View) -> GuardDecision {
        redirect(view)
    }

    fn parent_session(with_kid: bool) -> AppSession {
        let mut session = AppSession {
            role: Some(Role::Parent),
            active_parent_id: Some("parent_1".to_string()),
            ..AppSession::default()
        };
        session.parent_profiles.push(ParentProfile {
            id: "parent_1".to_string(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
        });
        if with_kid {
            session.add_kid("parent_1", "Sam", 6, "").unwrap();
        }
        session
    }

    fn teacher(id: &str) -> TeacherProfile {
        TeacherProfile {
            id: id.to_string(),
            name: "T".to_string(),
            email: String::new(),
            bio: String::new(),
            avatar: String::new(),
            subjects: vec![],
            certificates: vec![],
            rating: 0.0,
            rating_count: 0,
            reviews: vec![],
            verification_status: VerificationStatus::Verified,
            is_verified: true,
        }
    }

    #[test]
    fn root_with_no_role_resolves_to_splash() {
        let session = AppSession::default();
        assert_eq!(eval(&session, "/"), to(View::Splash));
        assert_eq!(eval(&session, "/splash"), GuardDecision::Stay);
        assert_eq!(eval(&session, "/unknown"), to(View::Splash));
    }

    #[test]
    fn no_role_is_sent_to_role_selection() {
        let session = AppSession::default();
        assert_eq!(eval(&session, "/kidhome"), to(View::RoleSelection));
        assert_eq!(eval(&session, "/login"), GuardDecision::Stay);
        assert_eq!(eval(&session, "/roleselection"), GuardDecision::Stay);
    }

    #[test]
    fn loading_defers_role_rules() {
        let session = parent_session(false);
        let decision = guard().evaluate(&GuardContext {
            path: "/parentdashboard",
            session: &session,
            loading: true,
            teachers: &[],
        });
        assert_eq!(decision, GuardDecision::Defer);
    }

    #[test]
    fn parent_without_kids_is_sent_to_setup() {
        let session = parent_session(false);
        for path in ["/parentdashboard", "/coursecatalog", "/profileselection", "/kidprogress"] {
            assert_eq!(eval(&session, path), to(View::ParentSetup), "{}", path);
        }
        for path in ["/parentsetup", "/addkid", "/settings", "/chat"] {
            assert_eq!(eval(&session, path), GuardDecision::Stay, "{}", path);
        }
    }

    #[test]
    fn parent_with_kids_cannot_linger_on_kid_screens() {
        let session = parent_session(true);
        assert_eq!(eval(&session, "/kidhome"), to(View::ProfileSelection));
        assert_eq!(eval(&session, "/badges"), to(View::ProfileSelection));
        assert_eq!(eval(&session, "/settings"), GuardDecision::Stay);
        assert_eq!(eval(&session, "/chat"), GuardDecision::Stay);
        assert_eq!(eval(&session, "/teacherdashboard"), to(View::ProfileSelection));
        assert_eq!(eval(&session, "/parentdashboard"), GuardDecision::Stay);
    }

    #[test]
    fn parent_login_moves_to_profile_selection_once_logged_in() {
        let session = parent_session(true);
        assert_eq!(eval(&session, "/login"), to(View::ProfileSelection));

        let logged_out = AppSession {
            role: Some(Role::Parent),
            ..AppSession::default()
        };
        assert_eq!(eval(&logged_out, "/login"), GuardDecision::Stay);
        assert_eq!(eval(&logged_out, "/parentsetup"), GuardDecision::Stay);
        assert_eq!(eval(&logged_out, "/parentdashboard"), to(View::Login));
    }

    #[test]
    fn stale_parent_id_is_cleared() {
        let mut session = parent_session(true);
        session.active_parent_id = Some("parent_gone".to_string());
        assert_eq!(
            eval(&session, "/parentdashboard"),
            redirect_with(View::Login, SessionCorrection::ClearParentProfile)
        );
    }

    #[test]
    fn kid_without_profile_falls_back_to_parent_or_no_role() {
        let mut session = parent_session(true);
        session.role = Some(Role::Kid);
        session.active_kid_id = None;
        assert_eq!(
            eval(&session, "/kidhome"),
            redirect_with(View::ProfileSelection, SessionCorrection::DemoteToParent)
        );

        let orphan = AppSession {
            role: Some(Role::Kid),
            active_kid_id: Some("kid_gone".to_string()),
            ..AppSession::default()
        };
        assert_eq!(
            eval(&orphan, "/kidhome"),
            redirect_with(View::RoleSelection, SessionCorrection::ClearRole)
        );
    }

    #[test]
    fn kid_is_held_to_kid_screens() {
        let mut session = parent_session(true);
        let kid_id = session.kid_profiles[0].id.clone();
        session.role = Some(Role::Kid);
        session.active_kid_id = Some(kid_id);
        assert_eq!(eval(&session, "/parentdashboard"), to(View::KidHome));
        assert_eq!(eval(&session, "/roleselection"), to(View::KidHome));
        assert_eq!(eval(&session, "/stories"), GuardDecision::Stay);
        assert_eq!(eval(&session, "/splash"), GuardDecision::Stay);
    }

    #[test]
    fn teacher_rules() {
        let mut session = AppSession {
            role: Some(Role::Teacher),
            ..AppSession::default()
        };
        let teachers = vec![teacher("teacher_1")];
        let run = |session: &AppSession, path: &str| {
            guard().evaluate(&GuardContext {
                path,
                session,
                loading: false,
                teachers: &teachers,
            })
        };
        assert_eq!(run(&session, "/teachercourses"), to(View::Login));
        assert_eq!(run(&session, "/login"), GuardDecision::Stay);

        session.active_teacher_id = Some("teacher_1".to_string());
        assert_eq!(run(&session, "/login"), to(View::TeacherDashboard));
        assert_eq!(run(&session, "/admincourses"), to(View::TeacherDashboard));
        assert_eq!(run(&session, "/createcourse"), GuardDecision::Stay);

        session.active_teacher_id = Some("teacher_gone".to_string());
        assert_eq!(
            run(&session, "/teacherdashboard"),
            redirect_with(View::Login, SessionCorrection::ClearTeacherProfile)
        );
    }

    #[test]
    fn admin_rules() {
        let mut session = AppSession {
            role: Some(Role::Admin),
            ..AppSession::default()
        };
        assert_eq!(eval(&session, "/admincourses"), to(View::Login));

        session.admin_profiles.push(AdminProfile {
            id: "admin_1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        });
        session.active_admin_id = Some("admin_1".to_string());
        assert_eq!(eval(&session, "/login"), to(View::AdminDashboard));
        assert_eq!(eval(&session, "/kidhome"), to(View::AdminDashboard));
        assert_eq!(eval(&session, "/roleselection"), to(View::AdminDashboard));
        assert_eq!(eval(&session, "/adminteachers"), GuardDecision::Stay);
        assert_eq!(eval(&session, "/settings"), GuardDecision::Stay);
    }
}
