//! Property catalog screen of the dev dashboard.
//!
//! Besides the table (filter, visibility toggle, delete) the screen owns the
//! listing editor. Saving a listing with newly picked files is two calls:
//! the files go to `/api/upload` first, then the returned filenames are
//! appended to the kept ones and the listing is created or patched.

use ophir_core::models::{next_property_code, Category, NewProperty, Property, PropertyPatch, Role};

use crate::display::{format_date, format_price, format_surface, CatalogStats};
use crate::{Effect, Notice, PendingFile, Redirect, SessionStatus, ViewState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertiesScreen {
    pub view: ViewState<Vec<Property>>,
    pub filter: CatalogFilter,
    /// Listing with a visibility toggle or deletion in flight.
    pub busy: Option<String>,
    pub editor: Option<Editor>,
    pub notice: Option<Notice>,
    pub redirect: Option<Redirect>,
}

/// Table filter. An empty `search` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<Category>,
    /// Matched case-insensitively against name, location and code.
    pub search: String,
}

impl CatalogFilter {
    pub fn matches(&self, property: &Property) -> bool {
        if self.category.is_some_and(|c| c != property.category) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || [&property.name, &property.location, &property.property_id]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One line of the catalog table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRow {
    pub document_id: String,
    pub code: String,
    pub name: String,
    pub location: String,
    pub category: Category,
    pub price: String,
    pub surface: String,
    pub created: String,
    pub visible: bool,
    pub exclusive: bool,
    pub image_count: usize,
}

impl PropertyRow {
    fn of(property: &Property) -> Self {
        Self {
            document_id: property.document_id.clone(),
            code: property.property_id.clone(),
            name: property.name.clone(),
            location: property.location.clone(),
            category: property.category,
            price: format_price(&property.price),
            surface: format_surface(&property.surface, &property.surface_unit),
            created: format_date(&property.created_at),
            visible: property.visible,
            exclusive: property.exclusive,
            image_count: property.image_filenames().len(),
        }
    }
}

/// Text inputs of the listing form, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyForm {
    pub name: String,
    pub location: String,
    pub description: String,
    pub rooms: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub surface: String,
    pub surface_unit: String,
    pub price: String,
    pub property_type: String,
    pub parking: String,
    pub category: Category,
    pub visible_from: String,
    pub nearby_visits: String,
    pub views: String,
    pub exclusive: bool,
}

impl Default for PropertyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: String::new(),
            description: String::new(),
            rooms: String::new(),
            bedrooms: String::new(),
            bathrooms: String::new(),
            surface: String::new(),
            surface_unit: "m2".into(),
            price: String::new(),
            property_type: String::new(),
            parking: String::new(),
            category: Category::Patrimoine,
            visible_from: String::new(),
            nearby_visits: String::new(),
            views: String::new(),
            exclusive: false,
        }
    }
}

fn count_input(value: i32) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_count(input: &str) -> i32 {
    input.trim().parse().unwrap_or(0)
}

fn or_zero(input: &str) -> String {
    match input.trim() {
        "" => "0".to_string(),
        value => value.to_string(),
    }
}

fn filled(input: &str) -> Option<String> {
    let value = input.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn join_images(filenames: &[String]) -> Option<String> {
    (!filenames.is_empty()).then(|| filenames.join(","))
}

impl PropertyForm {
    /// Prefill for editing. A `"0"` price shows as an empty input.
    pub fn from_property(property: &Property) -> Self {
        Self {
            name: property.name.clone(),
            location: property.location.clone(),
            description: property.description.clone(),
            rooms: count_input(property.rooms),
            bedrooms: count_input(property.bedrooms),
            bathrooms: count_input(property.bathrooms),
            surface: property.surface.clone(),
            surface_unit: property.surface_unit.clone(),
            price: if property.price == "0" {
                String::new()
            } else {
                property.price.clone()
            },
            property_type: property.property_type.clone().unwrap_or_default(),
            parking: count_input(property.parking),
            category: property.category,
            visible_from: property.visible_from.clone().unwrap_or_default(),
            nearby_visits: property.nearby_visits.clone().unwrap_or_default(),
            views: property.views.clone().unwrap_or_default(),
            exclusive: property.exclusive,
        }
    }

    /// Body of `POST /api/properties`.
    pub fn to_new_property(&self, images: &[String]) -> NewProperty {
        NewProperty {
            name: Some(self.name.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            description: Some(self.description.clone()),
            rooms: Some(parse_count(&self.rooms)),
            bedrooms: Some(parse_count(&self.bedrooms)),
            bathrooms: Some(parse_count(&self.bathrooms)),
            surface: Some(or_zero(&self.surface)),
            surface_unit: Some(self.surface_unit.clone()),
            price: Some(or_zero(&self.price)),
            property_type: filled(&self.property_type),
            parking: Some(parse_count(&self.parking)),
            category: Some(self.category),
            images: join_images(images),
            visible_from: filled(&self.visible_from),
            nearby_visits: filled(&self.nearby_visits),
            views: filled(&self.views),
            visible: None,
            exclusive: Some(self.exclusive),
        }
    }

    /// Body of `PATCH /api/properties/{id}`. Every form field is sent; empty
    /// nullable inputs clear the column.
    pub fn to_patch(&self, images: &[String]) -> PropertyPatch {
        PropertyPatch {
            name: Some(self.name.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            description: Some(self.description.clone()),
            rooms: Some(parse_count(&self.rooms)),
            bedrooms: Some(parse_count(&self.bedrooms)),
            bathrooms: Some(parse_count(&self.bathrooms)),
            surface: Some(or_zero(&self.surface)),
            surface_unit: Some(self.surface_unit.clone()),
            price: Some(or_zero(&self.price)),
            property_type: Some(filled(&self.property_type)),
            parking: Some(parse_count(&self.parking)),
            category: Some(self.category),
            images: Some(join_images(images)),
            visible_from: Some(filled(&self.visible_from)),
            nearby_visits: Some(filled(&self.nearby_visits)),
            views: Some(filled(&self.views)),
            visible: None,
            exclusive: Some(self.exclusive),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { document_id: String },
}

/// Open add or edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub mode: EditorMode,
    pub form: PropertyForm,
    /// Filenames already on the listing, kept unless removed.
    pub existing_images: Vec<String>,
    /// Files picked but not uploaded yet.
    pub pending: Vec<PendingFile>,
    pub submitting: bool,
}

impl Editor {
    fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            form: PropertyForm::default(),
            existing_images: Vec::new(),
            pending: Vec::new(),
            submitting: false,
        }
    }

    fn edit(property: &Property) -> Self {
        Self {
            mode: EditorMode::Edit {
                document_id: property.document_id.clone(),
            },
            form: PropertyForm::from_property(property),
            existing_images: property
                .image_filenames()
                .into_iter()
                .map(str::to_string)
                .collect(),
            pending: Vec::new(),
            submitting: false,
        }
    }

    fn editing(&self, id: &str) -> bool {
        matches!(&self.mode, EditorMode::Edit { document_id } if document_id == id)
    }

    /// Create or patch call, once `uploaded` holds the new files' names.
    fn save(&self, uploaded: Vec<String>) -> Effect {
        match &self.mode {
            EditorMode::Create => Effect::CreateProperty(self.form.to_new_property(&uploaded)),
            EditorMode::Edit { document_id } => {
                let mut images = self.existing_images.clone();
                images.extend(uploaded);
                Effect::PatchProperty {
                    document_id: document_id.clone(),
                    patch: self.form.to_patch(&images),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesMsg {
    /// Screen opened; the session is checked before anything loads.
    Mount,
    SessionChecked(SessionStatus),
    Load,
    Loaded(Vec<Property>),
    LoadFailed(String),
    /// A call came back 401.
    SessionExpired,
    SetFilter(CatalogFilter),
    ToggleVisibility(String),
    /// A `PatchProperty` effect succeeded.
    Patched(String),
    /// The operator confirmed the deletion.
    Delete(String),
    Deleted(String),
    OpenCreate,
    OpenEdit(String),
    CloseEditor,
    FormChanged(PropertyForm),
    AddFiles(Vec<PendingFile>),
    RemoveFile(usize),
    RemoveExistingImage(usize),
    Submit,
    /// Filenames returned by `/api/upload`, in upload order.
    ImagesUploaded(Vec<String>),
    Created { property_id: String },
    ActionFailed(String),
    DismissNotice,
    Logout,
    /// Logout finished, successfully or not.
    LoggedOut,
}

impl PropertiesScreen {
    pub fn stats(&self) -> CatalogStats {
        self.view
            .loaded()
            .map(|all| CatalogStats::of(all))
            .unwrap_or_default()
    }

    /// Code the next created listing is expected to get.
    pub fn next_code(&self) -> String {
        next_property_code(self.stats().total as u64)
    }

    /// Table rows passing the current filter.
    pub fn rows(&self) -> Vec<PropertyRow> {
        self.view
            .loaded()
            .map(|all| {
                all.iter()
                    .filter(|p| self.filter.matches(p))
                    .map(PropertyRow::of)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find(&self, document_id: &str) -> Option<&Property> {
        self.view
            .loaded()?
            .iter()
            .find(|p| p.document_id == document_id)
    }

    fn saving(&self) -> bool {
        self.editor.as_ref().is_some_and(|e| e.submitting)
    }
}

/// `{visible: !current}` for the row's eye toggle.
pub fn toggle_visibility(property: &Property) -> PropertyPatch {
    PropertyPatch {
        visible: Some(!property.visible),
        ..PropertyPatch::default()
    }
}

pub fn update(screen: &mut PropertiesScreen, msg: PropertiesMsg) -> Option<Effect> {
    match msg {
        PropertiesMsg::Mount => Some(Effect::CheckSession),
        PropertiesMsg::SessionChecked(Some(Role::Dev)) => update(screen, PropertiesMsg::Load),
        PropertiesMsg::SessionChecked(Some(Role::Admin)) => {
            screen.redirect = Some(Redirect::Inbox);
            None
        }
        PropertiesMsg::SessionChecked(None)
        | PropertiesMsg::SessionExpired
        | PropertiesMsg::LoggedOut => {
            screen.redirect = Some(Redirect::Login);
            None
        }
        PropertiesMsg::Load => {
            screen.view = ViewState::Loading;
            Some(Effect::FetchProperties)
        }
        PropertiesMsg::Loaded(properties) => {
            screen.view = ViewState::Loaded(properties);
            None
        }
        PropertiesMsg::LoadFailed(reason) => {
            screen.view = ViewState::Error(reason);
            None
        }
        PropertiesMsg::SetFilter(filter) => {
            screen.filter = filter;
            None
        }
        PropertiesMsg::ToggleVisibility(id) => {
            if screen.busy.is_some() || screen.saving() {
                return None;
            }
            let patch = toggle_visibility(screen.find(&id)?);
            screen.busy = Some(id.clone());
            screen.notice = None;
            Some(Effect::PatchProperty {
                document_id: id,
                patch,
            })
        }
        PropertiesMsg::Patched(id) => {
            if screen.saving() && screen.editor.as_ref().is_some_and(|e| e.editing(&id)) {
                let name = screen
                    .editor
                    .take()
                    .map(|e| e.form.name)
                    .unwrap_or_default();
                screen.notice = Some(Notice::Success(format!("\"{name}\" updated")));
                return update(screen, PropertiesMsg::Load);
            }
            screen.busy = None;
            let property = screen
                .view
                .loaded_mut()?
                .iter_mut()
                .find(|p| p.document_id == id)?;
            property.visible = !property.visible;
            let verb = if property.visible { "shown" } else { "hidden" };
            screen.notice = Some(Notice::Success(format!("\"{}\" {verb}", property.name)));
            None
        }
        PropertiesMsg::Delete(id) => {
            if screen.busy.is_some() || screen.saving() {
                return None;
            }
            screen.busy = Some(id.clone());
            screen.notice = None;
            Some(Effect::DeleteProperty(id))
        }
        PropertiesMsg::Deleted(id) => {
            screen.busy = None;
            if let Some(properties) = screen.view.loaded_mut() {
                properties.retain(|p| p.document_id != id);
            }
            if screen.editor.as_ref().is_some_and(|e| e.editing(&id)) {
                screen.editor = None;
            }
            screen.notice = Some(Notice::Success("property deleted".into()));
            None
        }
        PropertiesMsg::OpenCreate => {
            screen.editor = Some(Editor::create());
            screen.notice = None;
            None
        }
        PropertiesMsg::OpenEdit(id) => {
            let editor = Editor::edit(screen.find(&id)?);
            screen.editor = Some(editor);
            screen.notice = None;
            None
        }
        PropertiesMsg::CloseEditor => {
            if !screen.saving() {
                screen.editor = None;
            }
            None
        }
        PropertiesMsg::FormChanged(form) => {
            if let Some(editor) = screen.editor.as_mut() {
                editor.form = form;
            }
            None
        }
        PropertiesMsg::AddFiles(files) => {
            if let Some(editor) = screen.editor.as_mut() {
                editor.pending.extend(files);
            }
            None
        }
        PropertiesMsg::RemoveFile(index) => {
            let editor = screen.editor.as_mut()?;
            if index < editor.pending.len() {
                editor.pending.remove(index);
            }
            None
        }
        PropertiesMsg::RemoveExistingImage(index) => {
            let editor = screen.editor.as_mut()?;
            if index < editor.existing_images.len() {
                editor.existing_images.remove(index);
            }
            None
        }
        PropertiesMsg::Submit => {
            if screen.busy.is_some() {
                return None;
            }
            let editor = screen.editor.as_mut()?;
            if editor.submitting {
                return None;
            }
            editor.submitting = true;
            let effect = if editor.pending.is_empty() {
                editor.save(Vec::new())
            } else {
                Effect::UploadImages(editor.pending.clone())
            };
            screen.notice = None;
            Some(effect)
        }
        PropertiesMsg::ImagesUploaded(filenames) => {
            let editor = screen.editor.as_mut()?;
            if !editor.submitting {
                return None;
            }
            editor.pending.clear();
            Some(editor.save(filenames))
        }
        PropertiesMsg::Created { property_id } => {
            screen.editor = None;
            screen.notice = Some(Notice::Success(format!("property created, ID {property_id}")));
            update(screen, PropertiesMsg::Load)
        }
        PropertiesMsg::ActionFailed(reason) => {
            screen.busy = None;
            if let Some(editor) = screen.editor.as_mut() {
                editor.submitting = false;
            }
            screen.notice = Some(Notice::Error(reason));
            None
        }
        PropertiesMsg::DismissNotice => {
            screen.notice = None;
            None
        }
        PropertiesMsg::Logout => Some(Effect::Logout),
    }
}
