//! services/app/src/controller.rs
//!
//! The application state container. Owns the persisted session, the cached
//! catalog collections and the navigation history, and re-runs the routing
//! guard after every change so the current screen is always legal.

use std::sync::Arc;

use kids_learning_core::{
    guard::{GuardContext, GuardDecision, RoutingGuard},
    ports::{GeneratedStory, PortError, StateStorage},
    session::{AppSession, KidProgress, SessionCorrection, STATE_STORAGE_KEY},
    status::EntityKind,
    store::{Record, RecordStore},
    views::View,
    Activity, ActivityCategory, ActivityStatus, AdminProfile, ChatMessage, Course, CourseStatus,
    KidProfile, NewActivity, NewCourse, NewReview, ParentProfile, ParentalControls, Role,
    TeacherProfile,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api_client::{ApiClient, Transport};
use crate::error::{AppError, AppResult};
use crate::pin::{hash_pin, validate_email, verify_pin};

/// Upper bound on chained redirects in one settle pass.
const MAX_REDIRECT_HOPS: usize = 8;

/// Reads the persisted session. Anything unreadable starts a fresh one.
fn rehydrate(storage: &dyn StateStorage) -> AppSession {
    match storage.get(STATE_STORAGE_KEY) {
        Ok(Some(json)) => match AppSession::from_json(&json) {
            Ok(session) => {
                info!("Restored persisted session (role: {:?})", session.role);
                session
            }
            Err(e) => {
                warn!("Discarding unreadable persisted session: {}", e);
                AppSession::default()
            }
        },
        Ok(None) => AppSession::default(),
        Err(e) => {
            warn!("Could not read persisted session: {}", e);
            AppSession::default()
        }
    }
}

pub struct AppController<T: Transport> {
    api: ApiClient<T>,
    storage: Arc<dyn StateStorage>,
    guard: RoutingGuard,
    session: AppSession,
    catalog: RecordStore,
    loading: bool,
    history: Vec<String>,
}

impl<T: Transport> AppController<T> {
    /// Restores the session from `storage` and positions the app at `/`.
    /// Collections start empty and `loading` stays set until
    /// [`load_collections`](Self::load_collections) runs.
    pub fn new(api: ApiClient<T>, storage: Arc<dyn StateStorage>, guard: RoutingGuard) -> Self {
        let session = rehydrate(storage.as_ref());
        let mut controller = Self {
            api,
            storage,
            guard,
            session,
            catalog: RecordStore::default(),
            loading: true,
            history: vec!["/".to_string()],
        };
        controller.settle();
        controller
    }

    // --- Read access ---

    pub fn session(&self) -> &AppSession {
        &self.session
    }

    pub fn teachers(&self) -> &[TeacherProfile] {
        self.catalog.teachers()
    }

    pub fn courses(&self) -> &[Course] {
        self.catalog.courses()
    }

    pub fn activities(&self) -> &[Activity] {
        self.catalog.activities()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn current_path(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("/")
    }

    pub fn current_view(&self) -> View {
        self.guard.current_view(self.current_path())
    }

    /// The id of whoever is acting under the current role.
    pub fn current_identity(&self) -> Option<&str> {
        match self.session.role? {
            Role::Kid => self.session.active_kid_id.as_deref(),
            Role::Parent => self.session.active_parent_id.as_deref(),
            Role::Teacher => self.session.active_teacher_id.as_deref(),
            Role::Admin => self.session.active_admin_id.as_deref(),
        }
    }

    // --- Loading ---

    /// Fetches all three collections concurrently. A failed fetch is logged
    /// and leaves that collection empty; it never aborts the others.
    pub async fn load_collections(&mut self) {
        self.loading = true;
        let (teachers, courses, activities) = futures::join!(
            self.api.get_teachers(),
            self.api.get_courses(),
            self.api.get_activities()
        );

        let teachers = teachers.unwrap_or_else(|e| {
            warn!("Failed to load teachers: {}", e);
            Vec::new()
        });
        let courses = courses.unwrap_or_else(|e| {
            warn!("Failed to load courses: {}", e);
            Vec::new()
        });
        let activities = activities.unwrap_or_else(|e| {
            warn!("Failed to load activities: {}", e);
            Vec::new()
        });

        info!(
            "Loaded {} teachers, {} courses, {} activities",
            teachers.len(),
            courses.len(),
            activities.len()
        );
        self.catalog = RecordStore::new(teachers, courses, activities);
        self.loading = false;
        self.settle();
    }

    // --- Navigation ---

    /// Pushes `path` onto the history, then lets the guard correct it.
    pub fn navigate(&mut self, path: &str) -> View {
        debug!("Navigating to {}", path);
        self.history.push(path.to_string());
        self.settle();
        self.current_view()
    }

    pub fn navigate_to(&mut self, view: View) -> View {
        let path = self.guard.routes().path_for(view);
        self.navigate(&path)
    }

    /// Pops one history entry. The first entry is never popped.
    pub fn back(&mut self) -> View {
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.settle();
        self.current_view()
    }

    fn replace_path(&mut self, path: String) {
        match self.history.last_mut() {
            Some(last) => *last = path,
            None => self.history.push(path),
        }
    }

    /// Runs the guard until it stops redirecting. Redirects replace the
    /// current history entry and apply any session correction they carry.
    fn settle(&mut self) -> GuardDecision {
        for _ in 0..MAX_REDIRECT_HOPS {
            let decision = self.guard.evaluate(&GuardContext {
                path: self.current_path(),
                session: &self.session,
                loading: self.loading,
                teachers: self.catalog.teachers(),
            });
            let redirect = match decision {
                GuardDecision::Redirect(redirect) => redirect,
                settled => return settled,
            };
            if let Some(correction) = redirect.correction {
                info!("Applying session correction {:?}", correction);
                self.session.apply(correction);
                self.persist();
            }
            let to = self.guard.routes().path_for(redirect.to);
            info!("Redirecting {} -> {}", self.current_path(), to);
            self.replace_path(to);
        }
        warn!("Routing did not settle after {} redirects", MAX_REDIRECT_HOPS);
        GuardDecision::Stay
    }

    /// Writes the session through to storage. Failures are logged only.
    fn persist(&self) {
        let result = self
            .session
            .to_json()
            .and_then(|json| self.storage.set(STATE_STORAGE_KEY, &json));
        if let Err(e) = result {
            warn!("Failed to persist session: {}", e);
        }
    }

    /// Persists, then re-evaluates the current screen.
    fn commit(&mut self) {
        self.persist();
        self.settle();
    }

    // --- Roles and identities ---

    pub fn select_role(&mut self, role: Role) -> View {
        info!("Role selected: {}", role);
        self.session.role = Some(role);
        self.persist();
        match role {
            Role::Kid => self.navigate_to(View::KidHome),
            _ => self.navigate_to(View::Login),
        }
    }

    /// Signs a parent in by email, creating the profile on first use.
    pub fn login_parent(&mut self, name: &str, email: &str) -> AppResult<ParentProfile> {
        let email = validate_email(email)?;
        let parent = match self
            .session
            .parent_profiles
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
        {
            Some(existing) => existing.clone(),
            None => {
                if name.trim().is_empty() {
                    return Err(
                        PortError::InvalidInput("Name must not be empty".to_string()).into(),
                    );
                }
                let created = ParentProfile {
                    id: format!("parent_{}", Uuid::new_v4().simple()),
                    name: name.trim().to_string(),
                    email: email.to_string(),
                };
                info!("Created parent profile {}", created.id);
                self.session.parent_profiles.push(created.clone());
                created
            }
        };
        self.session.role = Some(Role::Parent);
        self.session.active_parent_id = Some(parent.id.clone());
        self.session.active_kid_id = None;
        self.commit();
        Ok(parent)
    }

    /// Signs a teacher in against the loaded teacher collection.
    pub fn login_teacher(&mut self, email: &str) -> AppResult<TeacherProfile> {
        let email = validate_email(email)?;
        let teacher = self
            .catalog
            .teachers()
            .iter()
            .find(|t| t.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("No teacher with email {}", email)))?;
        self.session.role = Some(Role::Teacher);
        self.session.active_teacher_id = Some(teacher.id.clone());
        self.commit();
        Ok(teacher)
    }

    pub fn login_admin(&mut self, name: &str, email: &str) -> AppResult<AdminProfile> {
        let email = validate_email(email)?;
        let admin = match self
            .session
            .admin_profiles
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
        {
            Some(existing) => existing.clone(),
            None => {
                let created = AdminProfile {
                    id: format!("admin_{}", Uuid::new_v4().simple()),
                    name: name.trim().to_string(),
                    email: email.to_string(),
                };
                self.session.admin_profiles.push(created.clone());
                created
            }
        };
        self.session.role = Some(Role::Admin);
        self.session.active_admin_id = Some(admin.id.clone());
        self.commit();
        Ok(admin)
    }

    pub fn logout(&mut self) -> View {
        info!("Logging out");
        self.session.apply(SessionCorrection::ClearRole);
        self.persist();
        self.navigate_to(View::RoleSelection)
    }

    fn require_parent(&self) -> AppResult<ParentProfile> {
        self.session
            .active_parent()
            .cloned()
            .ok_or_else(|| AppError::NotAllowed("No parent is signed in".to_string()))
    }

    fn require_kid(&self) -> AppResult<KidProfile> {
        self.session
            .active_kid()
            .cloned()
            .ok_or_else(|| AppError::NotAllowed("No kid profile is active".to_string()))
    }

    fn require_teacher_id(&self) -> AppResult<String> {
        self.session
            .active_teacher_id
            .clone()
            .ok_or_else(|| AppError::NotAllowed("No teacher is signed in".to_string()))
    }

    /// The parent's own kid, or `NotAllowed` for someone else's.
    fn own_kid(&self, kid_id: &str) -> AppResult<KidProfile> {
        let parent = self.require_parent()?;
        match self.session.kid(kid_id) {
            Some(kid) if kid.parent_id == parent.id => Ok(kid.clone()),
            Some(_) => Err(AppError::NotAllowed(format!(
                "Kid {} does not belong to {}",
                kid_id, parent.id
            ))),
            None => Err(PortError::NotFound(format!("Kid not found: {}", kid_id)).into()),
        }
    }

    // --- Kids and parental controls ---

    pub fn add_kid(&mut self, name: &str, age: u8, avatar: &str) -> AppResult<KidProfile> {
        let parent = self.require_parent()?;
        let kid = self.session.add_kid(&parent.id, name, age, avatar)?;
        info!("Added kid {} for parent {}", kid.id, parent.id);
        self.commit();
        Ok(kid)
    }

    /// Enters kid mode for one of the active parent's kids.
    pub fn select_kid(&mut self, kid_id: &str) -> AppResult<View> {
        let kid = self.own_kid(kid_id)?;
        self.session.active_kid_id = Some(kid.id);
        self.session.role = Some(Role::Kid);
        self.persist();
        Ok(self.navigate_to(View::KidHome))
    }

    pub fn set_parental_pin(&mut self, kid_id: &str, pin: &str) -> AppResult<()> {
        let kid = self.own_kid(kid_id)?;
        let pin_hash = hash_pin(pin)?;
        self.session
            .parental_controls
            .entry(kid.id.clone())
            .or_insert_with(|| ParentalControls::new(kid.id.clone()))
            .pin_hash = Some(pin_hash);
        self.persist();
        Ok(())
    }

    pub fn update_parental_controls(
        &mut self,
        kid_id: &str,
        daily_time_limit_minutes: Option<u32>,
        allowed_categories: Vec<ActivityCategory>,
        chat_enabled: bool,
    ) -> AppResult<ParentalControls> {
        let kid = self.own_kid(kid_id)?;
        let controls = self
            .session
            .parental_controls
            .entry(kid.id.clone())
            .or_insert_with(|| ParentalControls::new(kid.id.clone()));
        controls.daily_time_limit_minutes = daily_time_limit_minutes;
        controls.allowed_categories = allowed_categories;
        controls.chat_enabled = chat_enabled;
        let updated = controls.clone();
        self.persist();
        Ok(updated)
    }

    /// Leaves kid mode. When the kid has a PIN set, `pin` must match it.
    pub fn exit_kid_mode(&mut self, pin: Option<&str>) -> AppResult<View> {
        let kid = self.require_kid()?;
        if let Some(pin_hash) = self
            .session
            .controls_for(&kid.id)
            .and_then(|c| c.pin_hash.as_deref())
        {
            let entered = pin.unwrap_or_default();
            if !verify_pin(entered, pin_hash)? {
                warn!("Wrong parental PIN entered for {}", kid.id);
                return Err(AppError::WrongPin);
            }
        }
        self.session.apply(SessionCorrection::DemoteToParent);
        self.persist();
        Ok(self.navigate_to(View::ProfileSelection))
    }

    // --- Kid experience ---

    /// Approved activities for the active kid's age group that their
    /// parental controls allow.
    pub fn kid_activities(&self) -> Vec<&Activity> {
        let Some(kid) = self.session.active_kid() else {
            return Vec::new();
        };
        let age_group = kid.age_group();
        let controls = self.session.controls_for(&kid.id);
        self.catalog
            .activities()
            .iter()
            .filter(|a| a.status == ActivityStatus::Approved)
            .filter(|a| a.age_groups.contains(&age_group))
            .filter(|a| controls.map_or(true, |c| c.allows(a.category)))
            .collect()
    }

    /// Courses a parent can enroll in.
    pub fn catalog_courses(&self) -> Vec<&Course> {
        self.catalog
            .courses()
            .iter()
            .filter(|c| c.status == CourseStatus::Active)
            .collect()
    }

    /// Marks an activity done for the active kid, crediting its points and a
    /// category badge.
    pub fn complete_activity(&mut self, activity_id: &str) -> AppResult<KidProfile> {
        let kid = self.require_kid()?;
        let activity = self
            .catalog
            .activities()
            .iter()
            .find(|a| a.id == activity_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Activity not found: {}", activity_id)))?;
        self.session.complete_activity(&kid.id, &activity)?;
        self.session
            .award_badge(&kid.id, &format!("{:?} Explorer", activity.category))?;
        self.persist();
        self.require_kid()
    }

    pub fn award_badge(&mut self, kid_id: &str, badge_name: &str) -> AppResult<()> {
        self.session.award_badge(kid_id, badge_name)?;
        self.persist();
        Ok(())
    }

    pub fn enroll_in_course(&mut self, kid_id: &str, course_id: &str) -> AppResult<()> {
        let kid = self.own_kid(kid_id)?;
        let course = self
            .catalog
            .courses()
            .iter()
            .find(|c| c.id == course_id)
            .ok_or_else(|| PortError::NotFound(format!("Course not found: {}", course_id)))?;
        if course.status != CourseStatus::Active {
            return Err(AppError::NotAllowed(format!(
                "Course {} is not open for enrollment",
                course_id
            )));
        }
        self.session.enroll_in_course(&kid.id, course_id)?;
        self.persist();
        Ok(())
    }

    pub fn kid_progress(&self, kid_id: &str) -> Option<KidProgress> {
        self.session.kid_progress(kid_id, self.catalog.courses())
    }

    pub async fn generate_story(&self, prompt: &str) -> AppResult<GeneratedStory> {
        let kid = self.require_kid()?;
        Ok(self.api.generate_story(prompt, kid.age_group()).await?)
    }

    pub async fn ask_question(&self, question: &str, context: Option<&str>) -> AppResult<String> {
        Ok(self.api.ask(question, context).await?)
    }

    // --- Chat ---

    /// Opens the conversation between `a` and `b`, creating it on first use.
    pub fn start_or_go_to_chat(&mut self, a: &str, b: &str) -> AppResult<String> {
        let id = self.session.start_or_go_to_chat(a, b)?;
        self.persist();
        Ok(id)
    }

    /// Opens a chat between the current identity and `other_id`. Kids may
    /// only chat when their parental controls allow it.
    pub fn chat_with(&mut self, other_id: &str) -> AppResult<String> {
        let me = self
            .current_identity()
            .map(str::to_string)
            .ok_or_else(|| AppError::NotAllowed("Sign in to chat".to_string()))?;
        if self.session.role == Some(Role::Kid) {
            let enabled = self
                .session
                .controls_for(&me)
                .map_or(false, |c| c.chat_enabled);
            if !enabled {
                return Err(AppError::NotAllowed("Chat is turned off for this kid".to_string()));
            }
        }
        let id = self.start_or_go_to_chat(&me, other_id)?;
        self.navigate_to(View::Chat);
        Ok(id)
    }

    pub fn send_message(&mut self, conversation_id: &str, text: &str) -> AppResult<ChatMessage> {
        let me = self
            .current_identity()
            .map(str::to_string)
            .ok_or_else(|| AppError::NotAllowed("Sign in to chat".to_string()))?;
        let message = self.session.send_message(conversation_id, &me, text)?;
        self.persist();
        Ok(message)
    }

    pub fn messages_for<'a>(&'a self, conversation_id: &'a str) -> Vec<&'a ChatMessage> {
        self.session.messages_for(conversation_id).collect()
    }

    // --- Catalog workflow ---

    /// Applies a status change to the cache, then sends it to the server.
    /// On success the server's copy replaces the cached one. On failure the
    /// optimistic copy stays and the error is returned.
    async fn patch_status(
        &mut self,
        kind: EntityKind,
        id: &str,
        new_status: &str,
    ) -> AppResult<Record> {
        self.catalog.patch_status(kind, id, new_status)?;
        let result = match kind {
            EntityKind::Teacher => self
                .api
                .update_teacher_verification(id, new_status)
                .await
                .map(Record::Teacher),
            EntityKind::Course => self
                .api
                .update_course_status(id, new_status)
                .await
                .map(Record::Course),
            EntityKind::Activity => self
                .api
                .update_activity_status(id, new_status)
                .await
                .map(Record::Activity),
        };
        match result {
            Ok(record) => {
                info!("{} {} is now {}", kind, id, new_status);
                self.catalog.upsert(record.clone());
                Ok(record)
            }
            Err(e) => {
                warn!("Server rejected {} {} -> {}: {}", kind, id, new_status, e);
                Err(e.into())
            }
        }
    }

    pub async fn update_teacher_verification(
        &mut self,
        teacher_id: &str,
        new_status: &str,
    ) -> AppResult<TeacherProfile> {
        Ok(self
            .patch_status(EntityKind::Teacher, teacher_id, new_status)
            .await?
            .into_teacher()?)
    }

    pub async fn update_course_status(
        &mut self,
        course_id: &str,
        new_status: &str,
    ) -> AppResult<Course> {
        Ok(self
            .patch_status(EntityKind::Course, course_id, new_status)
            .await?
            .into_course()?)
    }

    pub async fn update_activity_status(
        &mut self,
        activity_id: &str,
        new_status: &str,
    ) -> AppResult<Activity> {
        Ok(self
            .patch_status(EntityKind::Activity, activity_id, new_status)
            .await?
            .into_activity()?)
    }

    /// Sends the active teacher's documents for review.
    pub async fn submit_verification(&mut self, documents: Value) -> AppResult<TeacherProfile> {
        let teacher_id = self.require_teacher_id()?;
        let teacher = self.api.submit_verification(&teacher_id, documents).await?;
        self.catalog.upsert(Record::Teacher(teacher.clone()));
        Ok(teacher)
    }

    /// Submits a course owned by the active teacher.
    pub async fn submit_course(&mut self, mut draft: NewCourse) -> AppResult<Course> {
        draft.teacher_id = self.require_teacher_id()?;
        let course = self.api.create_course(&draft).await?;
        info!("Submitted course {} for review", course.id);
        self.catalog.upsert(Record::Course(course.clone()));
        Ok(course)
    }

    pub async fn submit_activity(&mut self, mut draft: NewActivity) -> AppResult<Activity> {
        draft.created_by = Some(self.require_teacher_id()?);
        let activity = self.api.create_activity(&draft).await?;
        info!("Submitted activity {} for review", activity.id);
        self.catalog.upsert(Record::Activity(activity.clone()));
        Ok(activity)
    }

    /// Reviews a teacher as the active parent.
    pub async fn submit_review(
        &mut self,
        teacher_id: &str,
        rating: u8,
        comment: &str,
        course_id: Option<&str>,
    ) -> AppResult<TeacherProfile> {
        let parent = self.require_parent()?;
        let review = NewReview {
            parent_id: parent.id,
            parent_name: parent.name,
            rating,
            comment: comment.to_string(),
            course_id: course_id.map(str::to_string),
        };
        let teacher = self.api.add_review(teacher_id, &review).await?;
        self.catalog.upsert(Record::Teacher(teacher.clone()));
        Ok(teacher)
    }
}
