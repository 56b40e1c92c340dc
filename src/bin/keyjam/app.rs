//! Client session: local keys in, relayed events in, audio and screen out

use std::{collections::BTreeMap, io, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use keyjam::{
    dsp::OscillatorKind,
    engine::device::AudioDevice,
    io::InboundMessage,
    net::{NetworkEventRouter, TcpTransport},
    synth::ParticipantId,
};
use ratatui::DefaultTerminal;
use rtrb::Consumer;

use super::keyboard::{action_for, KeyAction};
use super::ui;

/// Everything the screen shows.
pub struct SessionView {
    pub server: String,
    pub connected: bool,
    pub sound: OscillatorKind,
    /// Note held by this client.
    pub local_note: Option<i32>,
    /// Notes held by other participants.
    pub remote_notes: BTreeMap<ParticipantId, i32>,
    /// Timbre each other participant last picked.
    pub remote_sounds: BTreeMap<ParticipantId, OscillatorKind>,
    /// Whether key releases are reported by the terminal.
    pub key_release: bool,
}

pub struct App {
    router: NetworkEventRouter<TcpTransport>,
    inbound: Consumer<String>,
    device: AudioDevice,
    view: SessionView,
    should_quit: bool,
}

impl App {
    pub fn new(
        server: String,
        router: NetworkEventRouter<TcpTransport>,
        inbound: Consumer<String>,
        device: AudioDevice,
    ) -> Self {
        Self {
            router,
            inbound,
            device,
            view: SessionView {
                server,
                connected: true,
                sound: OscillatorKind::Sine,
                local_note: None,
                remote_notes: BTreeMap::new(),
                remote_sounds: BTreeMap::new(),
                key_release: false,
            },
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.view.key_release = supports_keyboard_enhancement().unwrap_or(false);
        if self.view.key_release {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.event_loop(terminal);

        if self.view.key_release {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        self.shutdown();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_network();

            terminal.draw(|frame| ui::render(frame, &self.view))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn poll_network(&mut self) {
        while let Ok(line) = self.inbound.pop() {
            match self.router.handle_inbound(&line) {
                Some(InboundMessage::NoteOn { note, id }) => {
                    self.view.remote_notes.insert(id, note);
                }
                Some(InboundMessage::NoteOff { id }) => {
                    self.view.remote_notes.remove(&id);
                }
                Some(InboundMessage::SoundTypeChanged { sound_type, id }) => {
                    self.view.remote_sounds.insert(id, sound_type);
                }
                Some(InboundMessage::ParticipantLeft { id }) => {
                    self.view.remote_notes.remove(&id);
                    self.view.remote_sounds.remove(&id);
                }
                Some(InboundMessage::Unknown) | None => {}
            }
        }

        if self.view.connected && self.inbound.is_abandoned() {
            tracing::warn!("lost connection to relay, playing locally only");
            self.view.connected = false;
            self.view.remote_notes.clear();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let Some(action) = action_for(key.code) else {
            return;
        };

        match (key.kind, action) {
            (KeyEventKind::Press, KeyAction::Quit) => self.should_quit = true,
            (KeyEventKind::Press, KeyAction::Note(note)) => {
                if self.view.local_note != Some(note) {
                    self.view.local_note = Some(note);
                    let sent = self.router.local_note_on(note);
                    self.report(sent);
                }
            }
            (KeyEventKind::Release, KeyAction::Note(note))
                if self.view.local_note == Some(note) =>
            {
                self.release();
            }
            (KeyEventKind::Press, KeyAction::Release) => self.release(),
            (KeyEventKind::Press, KeyAction::Sound(kind)) => {
                self.view.sound = kind;
                let sent = self.router.local_sound_changed(kind);
                self.report(sent);
            }
            _ => {}
        }
    }

    fn release(&mut self) {
        if self.view.local_note.take().is_some() {
            let sent = self.router.local_note_off();
            self.report(sent);
        }
    }

    fn report(&mut self, sent: Result<(), keyjam::TransportError>) {
        if let Err(err) = sent {
            if self.view.connected {
                tracing::warn!("failed to notify relay: {err}");
            }
            self.view.connected = false;
        }
    }

    fn shutdown(&mut self) {
        self.release();
        self.router.close();
        self.device.close();
    }
}
