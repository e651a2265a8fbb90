//! Giao diện Patientor cho môi trường WebAssembly: danh sách bệnh nhân,
//! trang chi tiết và các form thêm entry.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use crate::styles;
    use patientor_api::{ApiConfig, JsApiConfig};
    use patientor_core::{
        Diagnosis, Entry, EntryDraft, EntryKind, Gender, HealthCheckRating, NewPatient, Patient,
        PatientDirectory,
    };
    use patientor_entries::{
        render_entry, CommonFields, DiagnosisLine, DraftForm, EntryComposer, HealthCheckForm,
        HospitalForm, OccupationalForm,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::events::{InputEvent, SubmitEvent};
    use yew::prelude::*;
    use yew::TargetCast;
    use yew_router::prelude::*;

    #[derive(Clone, Routable, PartialEq)]
    enum Route {
        #[at("/")]
        PatientList,
        #[at("/:id")]
        Patient { id: String },
    }

    #[derive(Properties, PartialEq)]
    pub struct AppProps {
        pub config: ApiConfig,
    }

    #[function_component(App)]
    fn app(props: &AppProps) -> Html {
        let patients = use_state(PatientDirectory::new);
        let diagnoses = use_state(Vec::<Diagnosis>::new);
        let load_failed = use_state(|| false);

        {
            let patients = patients.clone();
            let diagnoses = diagnoses.clone();
            let load_failed = load_failed.clone();
            let config = props.config.clone();
            use_effect_with((), move |_| {
                if let Some(window) = web_sys::window() {
                    if let Some(document) = window.document() {
                        if let Err(err) = styles::ensure_styles(&document) {
                            console::error_1(&err);
                        }
                    }
                }

                // Three independent startup requests; each lands in its own
                // state slice, completion order does not matter.
                {
                    let config = config.clone();
                    spawn_local(async move {
                        if let Err(err) = patientor_api::ping(&config).await {
                            console::warn_1(&JsValue::from_str(&format!("ping failed: {err}")));
                        }
                    });
                }
                {
                    let config = config.clone();
                    spawn_local(async move {
                        match patientor_api::fetch_patients(&config).await {
                            Ok(list) => patients.set(PatientDirectory::from(list)),
                            Err(err) => {
                                console::error_1(&JsValue::from_str(&format!(
                                    "patient list fetch failed: {err}"
                                )));
                                load_failed.set(true);
                            }
                        }
                    });
                }
                {
                    spawn_local(async move {
                        match patientor_api::fetch_diagnoses(&config).await {
                            Ok(list) => diagnoses.set(list),
                            Err(err) => console::error_1(&JsValue::from_str(&format!(
                                "diagnosis list fetch failed: {err}"
                            ))),
                        }
                    });
                }
                || ()
            });
        }

        let on_patient_created = {
            let patients = patients.clone();
            Callback::from(move |patient: Patient| {
                let mut next = (*patients).clone();
                next.insert(patient);
                patients.set(next);
            })
        };

        // The only code path that grows an entry list; the directory makes
        // sure nothing but the matching patient changes.
        let on_entry_added = {
            let patients = patients.clone();
            Callback::from(move |(patient_id, entry): (String, Entry)| {
                let mut next = (*patients).clone();
                match next.append_entry(&patient_id, entry) {
                    Ok(_) => patients.set(next),
                    Err(err) => console::error_1(&JsValue::from_str(&err.to_string())),
                }
            })
        };

        let render = {
            let patients = patients.clone();
            let diagnoses = diagnoses.clone();
            let config = props.config.clone();
            let load_failed = load_failed.clone();
            move |route: Route| match route {
                Route::PatientList => html! {
                    <PatientListPage
                        directory={(*patients).clone()}
                        config={config.clone()}
                        load_failed={*load_failed}
                        on_patient_created={on_patient_created.clone()}
                    />
                },
                Route::Patient { id } => html! {
                    <PatientPage
                        {id}
                        directory={(*patients).clone()}
                        diagnoses={(*diagnoses).clone()}
                        config={config.clone()}
                        on_entry_added={on_entry_added.clone()}
                    />
                },
            }
        };

        html! {
            <BrowserRouter>
                <div class="patientor-root">
                    <header class="patientor-header">
                        <h1>{"Patientor"}</h1>
                        <Link<Route> to={Route::PatientList} classes="patientor-home">
                            {"Home"}
                        </Link<Route>>
                    </header>
                    <Switch<Route> render={render} />
                </div>
            </BrowserRouter>
        }
    }

    #[derive(Properties, PartialEq)]
    struct PatientListProps {
        directory: PatientDirectory,
        config: ApiConfig,
        load_failed: bool,
        on_patient_created: Callback<Patient>,
    }

    #[function_component(PatientListPage)]
    fn patient_list_page(props: &PatientListProps) -> Html {
        html! {
            <section class="patient-list">
                <h2>{"Patient list"}</h2>
                {
                    if props.load_failed {
                        html! { <p class="patientor-error">{"Could not load the patient list"}</p> }
                    } else {
                        Html::default()
                    }
                }
                <table>
                    <thead>
                        <tr>
                            <th>{"Name"}</th>
                            <th>{"Gender"}</th>
                            <th>{"Occupation"}</th>
                            <th>{"Entries"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {
                            for props.directory.iter().map(|patient| html! {
                                <tr key={patient.id.clone()}>
                                    <td>
                                        <Link<Route> to={Route::Patient { id: patient.id.clone() }}>
                                            { patient.name.clone() }
                                        </Link<Route>>
                                    </td>
                                    <td>{ gender_symbol(patient.gender) }</td>
                                    <td>{ patient.occupation.clone() }</td>
                                    <td>{ patient.entries.len() }</td>
                                </tr>
                            })
                        }
                    </tbody>
                </table>
                <AddPatientForm
                    config={props.config.clone()}
                    on_created={props.on_patient_created.clone()}
                />
            </section>
        }
    }

    #[derive(Clone, Default, PartialEq)]
    struct NewPatientFields {
        name: String,
        ssn: String,
        date_of_birth: String,
        occupation: String,
        gender: String,
    }

    impl NewPatientFields {
        fn set(&mut self, name: &str, value: &str) {
            match name {
                "name" => self.name = value.to_string(),
                "ssn" => self.ssn = value.to_string(),
                "dateOfBirth" => self.date_of_birth = value.to_string(),
                "occupation" => self.occupation = value.to_string(),
                _ => {}
            }
        }

        fn to_new_patient(&self) -> NewPatient {
            NewPatient {
                name: self.name.clone(),
                occupation: self.occupation.clone(),
                gender: parse_gender(&self.gender),
                ssn: (!self.ssn.is_empty()).then(|| self.ssn.clone()),
                date_of_birth: chrono::NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d")
                    .ok(),
            }
        }
    }

    #[derive(Properties, PartialEq)]
    struct AddPatientProps {
        config: ApiConfig,
        on_created: Callback<Patient>,
    }

    #[function_component(AddPatientForm)]
    fn add_patient_form(props: &AddPatientProps) -> Html {
        let fields = use_state(NewPatientFields::default);
        let failed = use_state(|| false);

        let oninput = {
            let fields = fields.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let mut next = (*fields).clone();
                next.set(&input.name(), &input.value());
                fields.set(next);
            })
        };

        let on_gender = {
            let fields = fields.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                let mut next = (*fields).clone();
                next.gender = select.value();
                fields.set(next);
            })
        };

        let onsubmit = {
            let fields = fields.clone();
            let failed = failed.clone();
            let config = props.config.clone();
            let on_created = props.on_created.clone();
            Callback::from(move |event: SubmitEvent| {
                event.prevent_default();
                let payload = fields.to_new_patient();
                let fields = fields.clone();
                let failed = failed.clone();
                let config = config.clone();
                let on_created = on_created.clone();
                spawn_local(async move {
                    match patientor_api::create_patient(&config, &payload).await {
                        Ok(patient) => {
                            fields.set(NewPatientFields::default());
                            failed.set(false);
                            on_created.emit(patient);
                        }
                        Err(err) => {
                            console::error_1(&JsValue::from_str(&format!(
                                "create patient failed: {err}"
                            )));
                            failed.set(true);
                        }
                    }
                });
            })
        };

        html! {
            <form class="patientor-form" onsubmit={onsubmit}>
                <h3>{"Add new patient"}</h3>
                { text_field("Name", "name", &fields.name, &oninput) }
                { text_field("Ssn", "ssn", &fields.ssn, &oninput) }
                { date_field("Date of birth", "dateOfBirth", &fields.date_of_birth, &oninput) }
                { text_field("Occupation", "occupation", &fields.occupation, &oninput) }
                <label class="patientor-field">
                    <span>{"Gender"}</span>
                    <select name="gender" onchange={on_gender} value={fields.gender.clone()}>
                        <option value="male" selected={fields.gender == "male"}>{"male"}</option>
                        <option value="female" selected={fields.gender == "female"}>{"female"}</option>
                        <option value="other" selected={fields.gender != "male" && fields.gender != "female"}>{"other"}</option>
                    </select>
                </label>
                {
                    if *failed {
                        html! { <p class="patientor-error">{"Could not create the patient"}</p> }
                    } else {
                        Html::default()
                    }
                }
                <div class="patientor-actions">
                    <button type="submit">{"ADD"}</button>
                </div>
            </form>
        }
    }

    #[derive(Properties, PartialEq)]
    struct PatientPageProps {
        id: String,
        directory: PatientDirectory,
        diagnoses: Vec<Diagnosis>,
        config: ApiConfig,
        on_entry_added: Callback<(String, Entry)>,
    }

    #[function_component(PatientPage)]
    fn patient_page(props: &PatientPageProps) -> Html {
        let composer = use_state(EntryComposer::default);

        let Some(patient) = props.directory.get(&props.id) else {
            // Unknown route id: a terminal message, not a crash.
            return html! { <p class="patientor-error">{"Something wrong happened"}</p> };
        };

        let on_open = {
            let composer = composer.clone();
            Callback::from(move |kind: EntryKind| {
                let mut next = *composer;
                next.open(kind);
                composer.set(next);
            })
        };

        let on_cancel = {
            let composer = composer.clone();
            Callback::from(move |_: ()| {
                let mut next = *composer;
                next.cancel();
                composer.set(next);
            })
        };

        let on_submit = {
            let composer = composer.clone();
            let config = props.config.clone();
            let patient_id = props.id.clone();
            let on_entry_added = props.on_entry_added.clone();
            Callback::from(move |draft: EntryDraft| {
                let composer = composer.clone();
                let config = config.clone();
                let patient_id = patient_id.clone();
                let on_entry_added = on_entry_added.clone();
                spawn_local(async move {
                    match patientor_api::submit_entry(&config, &patient_id, &draft).await {
                        Ok(entry) => {
                            on_entry_added.emit((patient_id, entry));
                            let mut next = *composer;
                            next.submitted();
                            composer.set(next);
                        }
                        // The form stays open so nothing typed is lost.
                        Err(err) => console::error_1(&JsValue::from_str(&format!(
                            "entry submission failed: {err}"
                        ))),
                    }
                });
            })
        };

        html! {
            <section class="patient-detail">
                <header class="patient-identity">
                    <h1>{ patient.name.clone() }</h1>
                    <span class="patient-gender">{ gender_symbol(patient.gender) }</span>
                </header>
                <div class="patient-facts">
                    <p>{ format!("ssn: {}", patient.ssn.clone().unwrap_or_default()) }</p>
                    <p>{ format!("occupation: {}", patient.occupation) }</p>
                </div>
                {
                    match composer.composing() {
                        Some(kind) => html! {
                            <div class="entry-form-frame">
                                <AddEntry {kind} on_submit={on_submit} on_cancel={on_cancel} />
                            </div>
                        },
                        None => html! {
                            <div class="entry-kind-buttons">
                                {
                                    for EntryKind::ALL.into_iter().map(|kind| {
                                        let on_open = on_open.clone();
                                        html! {
                                            <button
                                                type="button"
                                                onclick={Callback::from(move |_| on_open.emit(kind))}
                                            >
                                                { format!("New {}", kind.label()) }
                                            </button>
                                        }
                                    })
                                }
                            </div>
                        },
                    }
                }
                {
                    if patient.entries.is_empty() {
                        Html::default()
                    } else {
                        html! {
                            <>
                                <h2>{"Entries"}</h2>
                                {
                                    for patient.entries.iter().map(|entry| html! {
                                        <EntryCard
                                            key={entry.id().to_string()}
                                            entry={entry.clone()}
                                            diagnoses={props.diagnoses.clone()}
                                        />
                                    })
                                }
                            </>
                        }
                    }
                }
            </section>
        }
    }

    #[derive(Properties, PartialEq)]
    struct AddEntryProps {
        kind: EntryKind,
        on_submit: Callback<EntryDraft>,
        on_cancel: Callback<()>,
    }

    /// Form selection dispatch: one arm per entry variant, no fallback.
    #[function_component(AddEntry)]
    fn add_entry(props: &AddEntryProps) -> Html {
        let on_submit = props.on_submit.clone();
        let on_cancel = props.on_cancel.clone();
        match props.kind {
            EntryKind::HealthCheck => html! { <HealthCheckEntryForm {on_submit} {on_cancel} /> },
            EntryKind::Hospital => html! { <HospitalEntryForm {on_submit} {on_cancel} /> },
            EntryKind::OccupationalHealthcare => {
                html! { <OccupationalEntryForm {on_submit} {on_cancel} /> }
            }
        }
    }

    #[derive(Properties, PartialEq)]
    struct EntryFormProps {
        on_submit: Callback<EntryDraft>,
        on_cancel: Callback<()>,
    }

    fn form_input_handler<F>(form: UseStateHandle<F>) -> Callback<InputEvent>
    where
        F: DraftForm + Clone + 'static,
    {
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = (*form).clone();
            next.set_field(&input.name(), &input.value());
            form.set(next);
        })
    }

    fn form_submit_handler<F>(
        form: UseStateHandle<F>,
        on_submit: Callback<EntryDraft>,
    ) -> Callback<SubmitEvent>
    where
        F: DraftForm + Clone + 'static,
    {
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            on_submit.emit(form.to_draft());
        })
    }

    fn cancel_button(on_cancel: &Callback<()>) -> Html {
        let on_cancel = on_cancel.clone();
        html! {
            <button type="button" class="is-cancel" onclick={Callback::from(move |_| on_cancel.emit(()))}>
                {"Cancel"}
            </button>
        }
    }

    fn text_field(label: &str, name: &str, value: &str, oninput: &Callback<InputEvent>) -> Html {
        html! {
            <label class="patientor-field">
                <span>{ label.to_string() }</span>
                <input
                    type="text"
                    name={name.to_string()}
                    value={value.to_string()}
                    oninput={oninput.clone()}
                />
            </label>
        }
    }

    fn date_field(label: &str, name: &str, value: &str, oninput: &Callback<InputEvent>) -> Html {
        html! {
            <label class="patientor-field">
                <span>{ label.to_string() }</span>
                <input
                    type="date"
                    name={name.to_string()}
                    value={value.to_string()}
                    oninput={oninput.clone()}
                />
            </label>
        }
    }

    /// The fields every variant form shares. The diagnosis codes input
    /// echoes the parsed list joined with commas.
    fn common_inputs(common: &CommonFields, oninput: &Callback<InputEvent>) -> Html {
        html! {
            <>
                { text_field("Description", "description", &common.description, oninput) }
                { date_field("Date", "date", &common.date, oninput) }
                { text_field("Specialist", "specialist", &common.specialist, oninput) }
                { text_field("Diagnosis Codes", "diagnosisCodes", &common.diagnosis_codes.text(), oninput) }
            </>
        }
    }

    #[function_component(HealthCheckEntryForm)]
    fn health_check_entry_form(props: &EntryFormProps) -> Html {
        let form = use_state(HealthCheckForm::default);
        let oninput = form_input_handler(form.clone());
        let onsubmit = form_submit_handler(form.clone(), props.on_submit.clone());

        let on_rating = {
            let form = form.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                let mut next = (*form).clone();
                next.set_field("healthCheckRating", &select.value());
                form.set(next);
            })
        };

        html! {
            <form class="patientor-form" onsubmit={onsubmit}>
                <h2>{"New Health Check Entry"}</h2>
                { common_inputs(form.common(), &oninput) }
                <label class="patientor-field">
                    <span>{"Health Check Rating"}</span>
                    <select name="healthCheckRating" onchange={on_rating}>
                        {
                            for HealthCheckRating::ALL.into_iter().map(|rating| html! {
                                <option
                                    value={u8::from(rating).to_string()}
                                    selected={form.rating == rating}
                                >
                                    { rating.label() }
                                </option>
                            })
                        }
                    </select>
                </label>
                <div class="patientor-actions">
                    { cancel_button(&props.on_cancel) }
                    <button type="submit">{"ADD"}</button>
                </div>
            </form>
        }
    }

    #[function_component(HospitalEntryForm)]
    fn hospital_entry_form(props: &EntryFormProps) -> Html {
        let form = use_state(HospitalForm::default);
        let oninput = form_input_handler(form.clone());
        let onsubmit = form_submit_handler(form.clone(), props.on_submit.clone());

        html! {
            <form class="patientor-form" onsubmit={onsubmit}>
                <h2>{"New Hospital Entry"}</h2>
                { common_inputs(form.common(), &oninput) }
                <fieldset class="patientor-nested">
                    <legend>{"Discharge"}</legend>
                    { date_field("Date", "discharge.date", &form.discharge_date, &oninput) }
                    { text_field("Criteria", "discharge.criteria", &form.discharge_criteria, &oninput) }
                </fieldset>
                <div class="patientor-actions">
                    { cancel_button(&props.on_cancel) }
                    <button type="submit">{"ADD"}</button>
                </div>
            </form>
        }
    }

    #[function_component(OccupationalEntryForm)]
    fn occupational_entry_form(props: &EntryFormProps) -> Html {
        let form = use_state(OccupationalForm::default);
        let oninput = form_input_handler(form.clone());
        let onsubmit = form_submit_handler(form.clone(), props.on_submit.clone());

        html! {
            <form class="patientor-form" onsubmit={onsubmit}>
                <h2>{"New Occupational Health Care Entry"}</h2>
                { common_inputs(form.common(), &oninput) }
                { text_field("Employer Name", "employerName", &form.employer_name, &oninput) }
                <fieldset class="patientor-nested">
                    <legend>{"Sick Leave"}</legend>
                    { date_field("Start Date", "sickLeave.startDate", &form.sick_leave_start, &oninput) }
                    { date_field("End Date", "sickLeave.endDate", &form.sick_leave_end, &oninput) }
                </fieldset>
                <div class="patientor-actions">
                    { cancel_button(&props.on_cancel) }
                    <button type="submit">{"ADD"}</button>
                </div>
            </form>
        }
    }

    #[derive(Properties, PartialEq)]
    struct EntryCardProps {
        entry: Entry,
        diagnoses: Vec<Diagnosis>,
    }

    #[function_component(EntryCard)]
    fn entry_card(props: &EntryCardProps) -> Html {
        let rendered = render_entry(&props.entry, &props.diagnoses);

        html! {
            <article class="entry-card" data-kind={kind_level(rendered.kind)}>
                <div class="entry-meta">
                    <span class="entry-date">{ rendered.date.clone() }</span>
                    <span class="entry-kind">{ rendered.kind.label() }</span>
                </div>
                {
                    rendered.employer.as_ref().map(|employer| html! {
                        <p class="entry-employer">{ format!("Employer name: {employer}") }</p>
                    }).unwrap_or_default()
                }
                <p class="entry-description">{ rendered.description.clone() }</p>
                {
                    if rendered.diagnoses.is_empty() {
                        Html::default()
                    } else {
                        html! {
                            <ul class="entry-diagnoses">
                                { for rendered.diagnoses.iter().map(diagnosis_line) }
                            </ul>
                        }
                    }
                }
                <p class="entry-specialist">{ rendered.specialist_line.clone() }</p>
            </article>
        }
    }

    fn diagnosis_line(line: &DiagnosisLine) -> Html {
        html! {
            <li>
                <span class="entry-code">{ line.code.clone() }</span>
                {
                    line.name.as_ref().map(|name| html! {
                        <span class="entry-code-name">{ format!(" {name}") }</span>
                    }).unwrap_or_default()
                }
            </li>
        }
    }

    fn gender_symbol(gender: Gender) -> &'static str {
        match gender {
            Gender::Male => "♂",
            Gender::Female => "♀",
            Gender::Other => "?",
        }
    }

    fn kind_level(kind: EntryKind) -> &'static str {
        match kind {
            EntryKind::HealthCheck => "health-check",
            EntryKind::Hospital => "hospital",
            EntryKind::OccupationalHealthcare => "occupational",
        }
    }

    fn parse_gender(value: &str) -> Gender {
        match value {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other,
        }
    }

    #[wasm_bindgen]
    pub fn mount_patientor_app(selector: &str, config: JsValue) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let config: ApiConfig = if config.is_undefined() || config.is_null() {
            ApiConfig::default()
        } else {
            let parsed: JsApiConfig = from_value(config)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            parsed.into()
        };

        yew::Renderer::<App>::with_root_and_props(target, AppProps { config }).render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_patientor_app;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_patientor_app(
    _: &str,
    _: wasm_bindgen::JsValue,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "patientor-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
