mod api;
mod clipboard;
mod config;
mod format;
mod history;
mod status;

use iced::{
    alignment,
    widget::{
        button, column, container, horizontal_space, pick_list, radio, row, scrollable, slider,
        text, text_editor, text_input, tooltip,
    },
    time, window, Element, Font, Length, Subscription, Task, Theme,
};
use std::time::{Duration, Instant};

use chrono::Local;

use crate::api::{ApiClient, ApiType, ClientInfo, HistoryPage, HistoryRecord, RequestPayload};
use crate::clipboard::ClipboardError;
use crate::history::HistoryStore;
use crate::status::{Kind, PromptIndicator, StatusLine};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn main() -> iced::Result {
    let config = config::Config::load();

    iced::application("LM Deck", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: iced::Size::new(config.window.width as f32, config.window.height as f32),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(App::new)
}

#[derive(Debug, Clone)]
enum Message {
    PromptEdited(text_editor::Action),
    ModelSelected(String),
    RefreshModels,
    ModelsLoaded(Result<Vec<String>, String>),
    TemperatureChanged(f64),
    MaxTokensChanged(String),
    ApiTypeSelected(ApiType),
    Submit,
    CompletionFinished {
        outcome: Result<String, String>,
        elapsed_secs: f64,
    },
    ClearPrompt,
    HistoryLoaded(Result<HistoryPage, String>),
    ToggleHistoryPrompt(i64),
    ToggleHistoryResponse(i64),
    UseRecord(i64),
    EditRecord(i64),
    DeleteRecord(i64),
    DeleteFinished {
        id: i64,
        outcome: Result<(), String>,
    },
    ClearHistory,
    ClearHistoryFinished(Result<Option<String>, String>),
    CopyResponse,
    CopyHistoryResponse(i64),
    CopyAckExpired(u64),
    ClientInfoLoaded(Result<ClientInfo, String>),
    ConfirmPending,
    CancelPending,
    Tick,
}

/// Destructive or overwriting actions wait in here until the user confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    UseRecord(i64),
    EditRecord(i64),
    DeleteRecord(i64),
    ClearHistory,
    ClearPrompt,
}

impl PendingAction {
    fn description(&self) -> &'static str {
        match self {
            PendingAction::UseRecord(_) => "Discard the current prompt and load this entry?",
            PendingAction::EditRecord(_) => "Discard the current prompt and edit this entry?",
            PendingAction::DeleteRecord(_) => "Delete this history entry?",
            PendingAction::ClearHistory => {
                "Delete the entire prompt history? This cannot be undone."
            }
            PendingAction::ClearPrompt => "Discard the current prompt?",
        }
    }
}

/// Which control is currently showing the transient "Copied" acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyTarget {
    Response,
    HistoryResponse(i64),
}

struct App {
    api: ApiClient,
    models: Vec<String>,
    selected_model: Option<String>,
    prompt: text_editor::Content,
    temperature: f64,
    max_tokens: String,
    api_type: ApiType,
    response: String,
    is_submitting: bool,
    spinner_frame: usize,
    status: StatusLine,
    indicator: PromptIndicator,
    store: HistoryStore,
    client_label: String,
    connected_at: Option<String>,
    pending: Option<PendingAction>,
    copy_ack: Option<CopyTarget>,
    copy_seq: u64,
}

fn load_models(api: ApiClient) -> Task<Message> {
    Task::future(async move {
        Message::ModelsLoaded(api.list_models().await.map_err(|e| e.to_string()))
    })
}

fn load_history(api: ApiClient) -> Task<Message> {
    Task::future(
        async move { Message::HistoryLoaded(api.history().await.map_err(|e| e.to_string())) },
    )
}

fn load_client_info(api: ApiClient) -> Task<Message> {
    Task::future(async move {
        Message::ClientInfoLoaded(api.client_info().await.map_err(|e| e.to_string()))
    })
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let config = config::Config::load();
        let api = ApiClient::new(config.server.base_url());

        let app = App {
            api: api.clone(),
            models: Vec::new(),
            selected_model: None,
            prompt: text_editor::Content::new(),
            temperature: config.defaults.temperature,
            max_tokens: config.defaults.max_tokens.to_string(),
            api_type: config.defaults.api_type,
            response: String::new(),
            is_submitting: false,
            spinner_frame: 0,
            status: StatusLine::new(),
            indicator: PromptIndicator::Hidden,
            store: HistoryStore::new(),
            client_label: "-".to_string(),
            connected_at: None,
            pending: None,
            copy_ack: None,
            copy_seq: 0,
        };

        let startup = Task::batch([
            load_models(api.clone()),
            load_history(api.clone()),
            load_client_info(api),
        ]);

        (app, startup)
    }

    /// Prompt text as typed; the editor reports a trailing newline that is
    /// not part of the input.
    fn prompt_text(&self) -> String {
        let text = self.prompt.text();
        match text.strip_suffix('\n') {
            Some(stripped) => stripped.to_string(),
            None => text,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PromptEdited(action) => {
                self.prompt.perform(action);
                let count = self.prompt_text().chars().count();
                if count == 0 {
                    self.status.info("Ready");
                } else if count == 1 {
                    self.status.info("1 character");
                } else {
                    self.status.info(format!("{} characters", count));
                }
                Task::none()
            }
            Message::ModelSelected(model) => {
                self.selected_model = Some(model);
                Task::none()
            }
            Message::RefreshModels => {
                self.status.busy("Fetching model list...");
                load_models(self.api.clone())
            }
            Message::ModelsLoaded(Ok(models)) => {
                self.selected_model = models.first().cloned();
                if models.is_empty() {
                    self.status.info("No models available");
                } else if models.len() == 1 {
                    self.status.success("1 model found");
                } else {
                    self.status.success(format!("{} models found", models.len()));
                }
                self.models = models;
                Task::none()
            }
            Message::ModelsLoaded(Err(e)) => {
                self.status.error(format!("Failed to fetch models: {}", e));
                Task::none()
            }
            Message::TemperatureChanged(value) => {
                self.temperature = value;
                Task::none()
            }
            Message::MaxTokensChanged(value) => {
                self.max_tokens = value;
                Task::none()
            }
            Message::ApiTypeSelected(api_type) => {
                self.api_type = api_type;
                Task::none()
            }
            Message::Submit => self.submit(),
            Message::CompletionFinished {
                outcome,
                elapsed_secs,
            } => {
                self.is_submitting = false;
                match outcome {
                    Ok(generated) => {
                        self.response = generated;
                        self.copy_ack = None;
                        self.indicator = PromptIndicator::Done;
                        self.status
                            .success(format!("Response generated in {:.2}s", elapsed_secs));
                        // reload runs on its own; the submission flow is done
                        load_history(self.api.clone())
                    }
                    Err(e) => {
                        self.response = format!(
                            "Request failed: {}\n\nCheck that:\n\
                             - the inference server is running\n\
                             - the network connection is up\n\
                             - the selected model is available\n\n\
                             Elapsed: {:.2}s",
                            e, elapsed_secs
                        );
                        self.indicator = PromptIndicator::Failed;
                        self.status
                            .error(format!("Error: {} ({:.2}s)", e, elapsed_secs));
                        Task::none()
                    }
                }
            }
            Message::ClearPrompt => {
                if self.prompt_text().trim().is_empty() {
                    self.apply_clear_prompt();
                } else {
                    self.pending = Some(PendingAction::ClearPrompt);
                }
                Task::none()
            }
            Message::HistoryLoaded(Ok(page)) => {
                let count = page.history.len();
                self.store.replace(page.history);
                match page.client_ip {
                    Some(ip) => {
                        self.status.success(format!(
                            "History loaded ({} items) - client {}",
                            count, ip
                        ));
                        self.client_label = ip;
                    }
                    None => {
                        self.status
                            .success(format!("History loaded ({} items)", count));
                    }
                }
                Task::none()
            }
            Message::HistoryLoaded(Err(e)) => {
                // prior cache stays as it was
                self.status.error(format!("Failed to load history: {}", e));
                Task::none()
            }
            Message::ToggleHistoryPrompt(id) => {
                self.store.toggle_prompt(id);
                Task::none()
            }
            Message::ToggleHistoryResponse(id) => {
                self.store.toggle_response(id);
                Task::none()
            }
            Message::UseRecord(id) => {
                if self.prompt_text().trim().is_empty() {
                    self.apply_use(id);
                } else {
                    self.pending = Some(PendingAction::UseRecord(id));
                }
                Task::none()
            }
            Message::EditRecord(id) => {
                if self.prompt_text().trim().is_empty() {
                    self.apply_edit(id);
                } else {
                    self.pending = Some(PendingAction::EditRecord(id));
                }
                Task::none()
            }
            Message::DeleteRecord(id) => {
                self.pending = Some(PendingAction::DeleteRecord(id));
                Task::none()
            }
            Message::ClearHistory => {
                self.pending = Some(PendingAction::ClearHistory);
                Task::none()
            }
            Message::ConfirmPending => {
                let Some(pending) = self.pending.take() else {
                    return Task::none();
                };
                match pending {
                    PendingAction::UseRecord(id) => {
                        self.apply_use(id);
                        Task::none()
                    }
                    PendingAction::EditRecord(id) => {
                        self.apply_edit(id);
                        Task::none()
                    }
                    PendingAction::ClearPrompt => {
                        self.apply_clear_prompt();
                        Task::none()
                    }
                    PendingAction::DeleteRecord(id) => {
                        self.status.busy("Deleting history entry...");
                        let api = self.api.clone();
                        Task::future(async move {
                            let outcome = api
                                .delete_history(id)
                                .await
                                .map(|_| ())
                                .map_err(|e| e.to_string());
                            Message::DeleteFinished { id, outcome }
                        })
                    }
                    PendingAction::ClearHistory => {
                        self.status.busy("Clearing history...");
                        let api = self.api.clone();
                        Task::future(async move {
                            Message::ClearHistoryFinished(
                                api.clear_history()
                                    .await
                                    .map(|ack| ack.client_ip)
                                    .map_err(|e| e.to_string()),
                            )
                        })
                    }
                }
            }
            Message::CancelPending => {
                self.pending = None;
                Task::none()
            }
            Message::DeleteFinished { id, outcome } => {
                match outcome {
                    Ok(()) => {
                        self.store.remove(id);
                        self.status
                            .success(format!("Deleted from history ({} left)", self.store.len()));
                    }
                    Err(e) => {
                        self.status.error(format!("Failed to delete entry: {}", e));
                    }
                }
                Task::none()
            }
            Message::ClearHistoryFinished(outcome) => {
                match outcome {
                    Ok(client_ip) => {
                        self.store.clear();
                        if let Some(ip) = client_ip {
                            self.client_label = ip;
                        }
                        self.status.success("Prompt history cleared");
                    }
                    Err(e) => {
                        self.status.error(format!("Failed to clear history: {}", e));
                    }
                }
                Task::none()
            }
            Message::CopyResponse => {
                let text = self.response.clone();
                self.copy(CopyTarget::Response, text)
            }
            Message::CopyHistoryResponse(id) => {
                let text = self
                    .store
                    .get(id)
                    .map(|r| r.response.clone())
                    .unwrap_or_default();
                self.copy(CopyTarget::HistoryResponse(id), text)
            }
            Message::CopyAckExpired(seq) => {
                if seq == self.copy_seq {
                    self.copy_ack = None;
                }
                Task::none()
            }
            Message::ClientInfoLoaded(Ok(info)) => {
                self.client_label = info.client_ip;
                self.connected_at = Some(info.timestamp);
                Task::none()
            }
            Message::ClientInfoLoaded(Err(_)) => {
                self.client_label = "unavailable".to_string();
                Task::none()
            }
            Message::Tick => {
                if self.is_submitting {
                    self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
                }
                Task::none()
            }
        }
    }

    fn submit(&mut self) -> Task<Message> {
        if self.is_submitting {
            return Task::none();
        }

        let prompt = self.prompt_text();
        if prompt.trim().is_empty() {
            self.status.error("Enter a prompt first");
            return Task::none();
        }

        let max_tokens = match self.max_tokens.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                self.status.error("Max tokens must be a positive number");
                return Task::none();
            }
        };

        let payload = RequestPayload {
            prompt: prompt.trim().to_string(),
            model: self.selected_model.clone().unwrap_or_default(),
            temperature: self.temperature,
            max_tokens,
        };

        self.is_submitting = true;
        self.spinner_frame = 0;
        self.indicator = PromptIndicator::Processing;
        self.status.busy("Sending request...");

        let api = self.api.clone();
        let api_type = self.api_type;

        Task::future(async move {
            let started = Instant::now();
            let outcome = api.complete(api_type, &payload).await;
            let elapsed_secs = started.elapsed().as_secs_f64();
            let outcome = outcome
                .map(|response| {
                    response
                        .text_for(api_type)
                        .unwrap_or(api::EMPTY_RESPONSE)
                        .to_string()
                })
                .map_err(|e| e.to_string());
            Message::CompletionFinished {
                outcome,
                elapsed_secs,
            }
        })
    }

    fn apply_use(&mut self, id: i64) {
        let Some(record) = self.store.get(id).cloned() else {
            return;
        };
        self.prompt = text_editor::Content::with_text(&record.prompt);
        self.api_type = record.api_type;
        self.response = record.response;
        self.copy_ack = None;
        self.status.info("Loaded prompt and response from history");
    }

    fn apply_edit(&mut self, id: i64) {
        let Some(record) = self.store.get(id).cloned() else {
            return;
        };
        self.prompt = text_editor::Content::with_text(&record.prompt);
        self.prompt
            .perform(text_editor::Action::Move(text_editor::Motion::DocumentEnd));
        self.api_type = record.api_type;
        self.response.clear();
        self.copy_ack = None;
        self.status.info("Editing a prompt from history");
    }

    fn apply_clear_prompt(&mut self) {
        self.prompt = text_editor::Content::new();
        self.response.clear();
        self.copy_ack = None;
        self.indicator = PromptIndicator::Hidden;
        self.status.info("Prompt cleared");
    }

    fn copy(&mut self, target: CopyTarget, text: String) -> Task<Message> {
        match clipboard::copy_text(&text) {
            Ok(count) => {
                self.status.success(format!("Copied {} characters", count));
                self.copy_ack = Some(target);
                self.copy_seq += 1;
                let seq = self.copy_seq;
                Task::future(async move {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Message::CopyAckExpired(seq)
                })
            }
            Err(ClipboardError::Empty) => {
                self.status.info("Nothing to copy");
                Task::none()
            }
            Err(e) => {
                self.status.error(e.to_string());
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.is_submitting {
            time::every(Duration::from_millis(100)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<Message> {
        let mut main_panel = column![].spacing(12);

        if let Some(pending) = self.pending {
            main_panel = main_panel.push(self.view_confirm_bar(pending));
        }

        main_panel = main_panel
            .push(self.view_form())
            .push(self.view_response())
            .push(self.view_status_line());

        let layout = row![
            main_panel.width(Length::Fill),
            self.view_history_panel(),
        ]
        .spacing(12);

        container(column![self.view_header(), layout].spacing(12))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(12)
            .into()
    }

    fn view_header(&self) -> Element<Message> {
        let client_text = text(format!("client: {}", self.client_label))
            .size(13)
            .style(text::secondary);

        let client: Element<Message> = match &self.connected_at {
            Some(connected_at) => tooltip(
                client_text,
                text(format!("connected at {}", connected_at)).size(12),
                tooltip::Position::Bottom,
            )
            .style(container::rounded_box)
            .into(),
            None => client_text.into(),
        };

        row![text("LM Deck").size(20), horizontal_space(), client]
            .align_y(alignment::Vertical::Center)
            .into()
    }

    fn view_confirm_bar(&self, pending: PendingAction) -> Element<Message> {
        let confirm = button(text("Confirm").size(13))
            .on_press(Message::ConfirmPending)
            .style(button::danger);
        let cancel = button(text("Cancel").size(13))
            .on_press(Message::CancelPending)
            .style(button::secondary);

        container(
            row![
                text(pending.description()).size(14),
                horizontal_space(),
                confirm,
                cancel,
            ]
            .spacing(10)
            .align_y(alignment::Vertical::Center),
        )
        .style(container::bordered_box)
        .padding(10)
        .width(Length::Fill)
        .into()
    }

    fn view_form(&self) -> Element<Message> {
        let model_row = row![
            pick_list(
                self.models.as_slice(),
                self.selected_model.clone(),
                Message::ModelSelected,
            )
            .placeholder("Select a model")
            .width(Length::Fill),
            button(text("Refresh").size(14))
                .on_press(Message::RefreshModels)
                .style(button::secondary),
        ]
        .spacing(10);

        let temperature_row = row![
            text(format!("Temperature: {:.2}", self.temperature))
                .size(14)
                .width(Length::Fixed(170.0)),
            slider(0.0..=2.0, self.temperature, Message::TemperatureChanged).step(0.05),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center);

        let options_row = row![
            text("Max tokens").size(14),
            text_input("4000", &self.max_tokens)
                .on_input(Message::MaxTokensChanged)
                .width(Length::Fixed(100.0)),
            horizontal_space(),
            radio("Chat", ApiType::Chat, Some(self.api_type), Message::ApiTypeSelected),
            radio("Text", ApiType::Text, Some(self.api_type), Message::ApiTypeSelected),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center);

        let mut prompt_heading = row![text("Prompt").size(16)].spacing(8);
        if let Some(label) = self.indicator.label() {
            let style: fn(&Theme) -> text::Style = match self.indicator {
                PromptIndicator::Processing => text::primary,
                PromptIndicator::Failed => text::danger,
                _ => text::success,
            };
            prompt_heading = prompt_heading.push(text(label).size(13).style(style));
        }

        let editor = text_editor(&self.prompt)
            .placeholder("Type a prompt (Enter inserts a newline)")
            .on_action(Message::PromptEdited)
            .height(Length::Fixed(160.0))
            .padding(10)
            .size(15);

        let send_label = if self.is_submitting { "Working..." } else { "Send" };
        let send = button(text(send_label).size(15))
            .on_press_maybe((!self.is_submitting).then_some(Message::Submit))
            .style(button::primary)
            .padding(10);
        let clear = button(text("Clear").size(15))
            .on_press(Message::ClearPrompt)
            .style(button::secondary)
            .padding(10);

        column![
            model_row,
            temperature_row,
            options_row,
            prompt_heading,
            editor,
            row![send, clear].spacing(10),
        ]
        .spacing(10)
        .into()
    }

    fn view_response(&self) -> Element<Message> {
        let mut heading = row![text("Response").size(16), horizontal_space()].spacing(8);
        if !self.response.is_empty() && !self.is_submitting {
            let copy_label = if self.copy_ack == Some(CopyTarget::Response) {
                "Copied"
            } else {
                "Copy"
            };
            heading = heading.push(
                button(text(copy_label).size(13))
                    .on_press(Message::CopyResponse)
                    .style(button::secondary),
            );
        }

        let body: Element<Message> = if self.is_submitting {
            container(
                column![
                    text(SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]).size(28),
                    text("Generating response...").size(14),
                ]
                .spacing(10)
                .align_x(alignment::Horizontal::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into()
        } else if self.response.is_empty() {
            container(
                text("The response will appear here")
                    .size(14)
                    .style(text::secondary),
            )
            .width(Length::Fill)
            .padding(15)
            .into()
        } else {
            scrollable(
                container(text(self.response.clone()).size(15))
                    .padding(15)
                    .width(Length::Fill),
            )
            .height(Length::Fill)
            .into()
        };

        container(column![heading, body].spacing(8))
            .style(container::bordered_box)
            .padding(10)
            .height(Length::Fill)
            .into()
    }

    fn view_status_line(&self) -> Element<Message> {
        let style: fn(&Theme) -> text::Style = match self.status.kind() {
            Kind::Error => text::danger,
            Kind::Success => text::success,
            Kind::Busy => text::primary,
            Kind::Info => text::secondary,
        };
        text(self.status.text().to_string()).size(13).style(style).into()
    }

    fn view_history_panel(&self) -> Element<Message> {
        let mut header = row![
            text(format!("History ({})", self.store.len())).size(16),
            horizontal_space(),
        ]
        .align_y(alignment::Vertical::Center);
        if !self.store.is_empty() {
            header = header.push(
                button(text("Clear all").size(13))
                    .on_press(Message::ClearHistory)
                    .style(button::danger),
            );
        }

        let body: Element<Message> = if self.store.is_empty() {
            container(
                column![
                    text("No prompts yet").size(15),
                    text("Sent prompts will show up here.")
                        .size(12)
                        .style(text::secondary),
                ]
                .spacing(5),
            )
            .width(Length::Fill)
            .padding(20)
            .into()
        } else {
            let now = Local::now();
            let mut list = column![].spacing(10);
            for record in self.store.records() {
                list = list.push(self.view_history_item(record, now));
            }
            scrollable(list.padding(4)).height(Length::Fill).into()
        };

        container(column![header, body].spacing(8))
            .width(Length::Fixed(380.0))
            .height(Length::Fill)
            .into()
    }

    fn view_history_item(
        &self,
        record: &HistoryRecord,
        now: chrono::DateTime<Local>,
    ) -> Element<Message> {
        let expansion = self.store.expansion(record.id);

        let header = row![
            text(record.api_type.label()).size(12).style(text::primary),
            horizontal_space(),
            text(format::timestamp_label(&record.timestamp, now))
                .size(12)
                .style(text::secondary),
        ];

        let prompt_label = if expansion.prompt {
            record.prompt.clone()
        } else {
            format::truncate(&record.prompt, format::PROMPT_PREVIEW_CHARS)
        };
        let prompt_block: Element<Message> =
            if format::needs_truncation(&record.prompt, format::PROMPT_PREVIEW_CHARS) {
                button(text(format!("Q: {}", prompt_label)).size(13))
                    .on_press(Message::ToggleHistoryPrompt(record.id))
                    .style(button::text)
                    .padding(0)
                    .into()
            } else {
                text(format!("Q: {}", prompt_label)).size(13).into()
            };

        let response_block: Element<Message> = if record.response.is_empty() {
            text("A: (no response)").size(13).style(text::secondary).into()
        } else {
            let response_label = if expansion.response {
                record.response.clone()
            } else {
                format::truncate(&record.response, format::RESPONSE_PREVIEW_CHARS)
            };
            if format::needs_truncation(&record.response, format::RESPONSE_PREVIEW_CHARS) {
                button(text(format!("A: {}", response_label)).size(13))
                    .on_press(Message::ToggleHistoryResponse(record.id))
                    .style(button::text)
                    .padding(0)
                    .into()
            } else {
                text(format!("A: {}", response_label)).size(13).into()
            }
        };

        let mut actions = row![
            button(text("Use").size(12))
                .on_press(Message::UseRecord(record.id))
                .style(button::secondary),
            button(text("Edit").size(12))
                .on_press(Message::EditRecord(record.id))
                .style(button::secondary),
            button(text("Delete").size(12))
                .on_press(Message::DeleteRecord(record.id))
                .style(button::danger),
            horizontal_space(),
        ]
        .spacing(6);
        if !record.response.is_empty() {
            let copy_label = if self.copy_ack == Some(CopyTarget::HistoryResponse(record.id)) {
                "Copied"
            } else {
                "Copy"
            };
            actions = actions.push(
                button(text(copy_label).size(12))
                    .on_press(Message::CopyHistoryResponse(record.id))
                    .style(button::secondary),
            );
        }

        container(column![header, prompt_block, response_block, actions].spacing(6))
            .style(container::bordered_box)
            .padding(10)
            .width(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        App::new().0
    }

    fn record(id: i64, prompt: &str, response: &str) -> HistoryRecord {
        HistoryRecord {
            id,
            prompt: prompt.to_string(),
            response: response.to_string(),
            api_type: ApiType::Text,
            timestamp: "2025-05-27T12:00:00".to_string(),
        }
    }

    #[test]
    fn empty_prompt_never_submits() {
        let mut app = app();
        let _ = app.update(Message::Submit);
        assert!(!app.is_submitting);
        assert_eq!(app.indicator, PromptIndicator::Hidden);
        assert!(app.response.is_empty());
    }

    #[test]
    fn whitespace_prompt_never_submits() {
        let mut app = app();
        app.prompt = text_editor::Content::with_text("   \n\t");
        let _ = app.update(Message::Submit);
        assert!(!app.is_submitting);
        assert_eq!(app.status.kind(), Kind::Error);
    }

    #[test]
    fn bad_max_tokens_is_rejected_locally() {
        let mut app = app();
        app.prompt = text_editor::Content::with_text("hi");
        app.max_tokens = "0".to_string();
        let _ = app.update(Message::Submit);
        assert!(!app.is_submitting);
        assert!(app.status.text().contains("Max tokens"));
    }

    #[test]
    fn valid_submit_enters_submitting_state() {
        let mut app = app();
        app.prompt = text_editor::Content::with_text("hi");
        let _ = app.update(Message::Submit);
        assert!(app.is_submitting);
        assert_eq!(app.indicator, PromptIndicator::Processing);
    }

    #[test]
    fn completion_success_updates_response_and_elapsed() {
        let mut app = app();
        app.is_submitting = true;
        let _ = app.update(Message::CompletionFinished {
            outcome: Ok("hello".to_string()),
            elapsed_secs: 1.234,
        });
        assert!(!app.is_submitting);
        assert_eq!(app.response, "hello");
        assert_eq!(app.indicator, PromptIndicator::Done);
        assert!(app.status.text().contains("1.23"));
    }

    #[test]
    fn completion_failure_shows_diagnostic_and_keeps_history() {
        let mut app = app();
        app.store.replace(vec![record(1, "old", "")]);
        app.is_submitting = true;
        let _ = app.update(Message::CompletionFinished {
            outcome: Err("overloaded".to_string()),
            elapsed_secs: 0.5,
        });
        assert!(app.response.contains("overloaded"));
        assert_eq!(app.indicator, PromptIndicator::Failed);
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn history_loaded_replaces_cache_and_reports_client() {
        let mut app = app();
        let _ = app.update(Message::HistoryLoaded(Ok(HistoryPage {
            history: vec![record(2, "a", ""), record(1, "b", "r")],
            client_ip: Some("192.168.1.5".to_string()),
        })));
        assert_eq!(app.store.len(), 2);
        assert_eq!(app.client_label, "192.168.1.5");
        assert!(app.status.text().contains("(2 items)"));
    }

    #[test]
    fn failed_history_load_keeps_prior_cache() {
        let mut app = app();
        app.store.replace(vec![record(1, "keep", "")]);
        let _ = app.update(Message::HistoryLoaded(Err("timeout".to_string())));
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.status.kind(), Kind::Error);
    }

    #[test]
    fn delete_finished_removes_exactly_one() {
        let mut app = app();
        app.store
            .replace(vec![record(3, "a", ""), record(2, "b", ""), record(1, "c", "")]);
        let _ = app.update(Message::DeleteFinished {
            id: 2,
            outcome: Ok(()),
        });
        let ids: Vec<i64> = app.store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(app.status.text().contains("2 left"));
    }

    #[test]
    fn failed_delete_leaves_cache_untouched() {
        let mut app = app();
        app.store.replace(vec![record(1, "a", "")]);
        let _ = app.update(Message::DeleteFinished {
            id: 1,
            outcome: Err("boom".to_string()),
        });
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn clear_history_only_empties_cache_on_success() {
        let mut app = app();
        app.store.replace(vec![record(1, "a", ""), record(2, "b", "")]);

        let _ = app.update(Message::ClearHistoryFinished(Err("offline".to_string())));
        assert_eq!(app.store.len(), 2);

        let _ = app.update(Message::ClearHistoryFinished(Ok(Some(
            "192.168.1.5".to_string(),
        ))));
        assert!(app.store.is_empty());
        assert_eq!(app.client_label, "192.168.1.5");
    }

    #[test]
    fn use_with_unsaved_text_waits_for_confirmation() {
        let mut app = app();
        app.store.replace(vec![record(1, "stored prompt", "stored response")]);
        app.prompt = text_editor::Content::with_text("draft");

        let _ = app.update(Message::UseRecord(1));
        assert_eq!(app.pending, Some(PendingAction::UseRecord(1)));
        assert_eq!(app.prompt_text(), "draft");

        let _ = app.update(Message::ConfirmPending);
        assert_eq!(app.pending, None);
        assert_eq!(app.prompt_text(), "stored prompt");
        assert_eq!(app.api_type, ApiType::Text);
        assert_eq!(app.response, "stored response");
    }

    #[test]
    fn use_applies_directly_with_an_empty_form() {
        let mut app = app();
        app.store.replace(vec![record(1, "stored", "")]);
        let _ = app.update(Message::UseRecord(1));
        assert_eq!(app.pending, None);
        assert_eq!(app.prompt_text(), "stored");
    }

    #[test]
    fn cancel_leaves_everything_in_place() {
        let mut app = app();
        app.store.replace(vec![record(1, "stored", "")]);
        app.prompt = text_editor::Content::with_text("draft");

        let _ = app.update(Message::UseRecord(1));
        let _ = app.update(Message::CancelPending);
        assert_eq!(app.pending, None);
        assert_eq!(app.prompt_text(), "draft");
    }

    #[test]
    fn edit_clears_the_displayed_response() {
        let mut app = app();
        app.store.replace(vec![record(1, "stored", "stored response")]);
        app.response = "visible".to_string();
        let _ = app.update(Message::EditRecord(1));
        assert_eq!(app.prompt_text(), "stored");
        assert!(app.response.is_empty());
    }

    #[test]
    fn delete_always_waits_for_confirmation() {
        let mut app = app();
        app.store.replace(vec![record(1, "a", "")]);
        let _ = app.update(Message::DeleteRecord(1));
        assert_eq!(app.pending, Some(PendingAction::DeleteRecord(1)));
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn models_loaded_autoselects_the_first_entry() {
        let mut app = app();
        let _ = app.update(Message::ModelsLoaded(Ok(vec![
            "llama-3".to_string(),
            "qwen-2.5".to_string(),
        ])));
        assert_eq!(app.selected_model.as_deref(), Some("llama-3"));
        assert!(app.status.text().contains("2 models"));
    }

    #[test]
    fn empty_model_list_gets_its_own_message() {
        let mut app = app();
        let _ = app.update(Message::ModelsLoaded(Ok(Vec::new())));
        assert_eq!(app.selected_model, None);
        assert_eq!(app.status.text(), "No models available");
    }

    #[test]
    fn copy_of_empty_response_reports_nothing_to_copy() {
        let mut app = app();
        let _ = app.update(Message::CopyResponse);
        assert_eq!(app.status.text(), "Nothing to copy");
        assert_eq!(app.copy_ack, None);
    }

    #[test]
    fn stale_copy_ack_expiry_is_ignored() {
        let mut app = app();
        app.copy_ack = Some(CopyTarget::Response);
        app.copy_seq = 2;

        let _ = app.update(Message::CopyAckExpired(1));
        assert_eq!(app.copy_ack, Some(CopyTarget::Response));

        let _ = app.update(Message::CopyAckExpired(2));
        assert_eq!(app.copy_ack, None);
    }

    #[test]
    fn expand_state_toggles_per_record() {
        let mut app = app();
        app.store
            .replace(vec![record(1, &"x".repeat(200), ""), record(2, "short", "")]);
        let _ = app.update(Message::ToggleHistoryPrompt(1));
        assert!(app.store.expansion(1).prompt);
        assert!(!app.store.expansion(2).prompt);
    }
}
