//! The session: one owned context for the whole composition core.
//!
//! A [`Session`] holds the window tree, the stream and file-reference
//! registries, the current output stream, and the style tables. There
//! are no globals; two sessions are fully independent. All calls are
//! synchronous and single-threaded by contract with the client.
//!
//! Every fallible operation reports failure through its return value
//! alone — invalid handles, bad arguments, and protocol violations are
//! logged and become no-ops, never panics.

use std::path::PathBuf;

use fictui_core::{Rect, Registry};
use fictui_style::{Hint, HintScope, StyleClass, StyleContext};
use tracing::{debug, trace, warn};

use crate::fileref::{FileRef, FileRefId};
use crate::host::{ContentHost, NullHost};
use crate::pair::{Division, PairData, SplitMethod, compute_split};
use crate::stream::{FileMode, FileStream, SeekMode, Stream, StreamId, StreamKind, StreamResult};
use crate::window::{LeafKind, Window, WindowId, WindowKind, WindowType};

/// The display-composition and I/O context.
pub struct Session {
    windows: Registry<Window>,
    streams: Registry<Stream>,
    filerefs: Registry<FileRef>,
    root: Option<WindowId>,
    current: Option<StreamId>,
    screen: Rect,
    styles: StyleContext,
    host: Box<dyn ContentHost>,
}

impl Session {
    /// Create a session over a screen of the given size, discarding all
    /// content callbacks.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_host(width, height, NullHost)
    }

    /// Create a session with a content-rendering collaborator.
    #[must_use]
    pub fn with_host(width: u16, height: u16, host: impl ContentHost + 'static) -> Self {
        Self {
            windows: Registry::new(),
            streams: Registry::new(),
            filerefs: Registry::new(),
            root: None,
            current: None,
            screen: Rect::from_size(width, height),
            styles: StyleContext::new(),
            host: Box::new(host),
        }
    }

    /// The screen rectangle layout currently targets.
    #[must_use]
    pub fn screen_rect(&self) -> Rect {
        self.screen
    }

    /// Style tables and published display globals.
    #[must_use]
    pub fn styles(&self) -> &StyleContext {
        &self.styles
    }

    /// Mutable style state, e.g. for the hint enable switch.
    pub fn styles_mut(&mut self) -> &mut StyleContext {
        &mut self.styles
    }

    // ── Window tree ────────────────────────────────────────────────────

    /// The root of the window tree.
    #[must_use]
    pub fn root_window(&self) -> Option<WindowId> {
        self.root
    }

    /// Open a window.
    ///
    /// With `split = None` this creates the root window; `method`,
    /// `size`, and `key` are ignored, and the call fails if a root
    /// already exists. Otherwise the target window is wrapped in a new
    /// pair whose other child is the new leaf: the new leaf sits on the
    /// `method.dir` side and becomes the pair's key unless an explicit
    /// `key` inside the split subtree is given.
    pub fn open_window(
        &mut self,
        split: Option<WindowId>,
        method: SplitMethod,
        size: u32,
        key: Option<WindowId>,
        kind: LeafKind,
        rock: u32,
    ) -> Option<WindowId> {
        let Some(target) = split else {
            if self.root.is_some() {
                warn!("window_open: a root window already exists");
                return None;
            }
            let wid = self.create_window(Window::new_leaf(kind, rock))?;
            self.root = Some(wid);
            let screen = self.screen;
            self.layout(wid, screen);
            return Some(wid);
        };

        if !self.windows.contains(target) {
            warn!("window_open: invalid split id");
            return None;
        }
        if method.division == Division::Proportional && size > 100 {
            warn!(size, "window_open: proportional size out of range");
            return None;
        }
        if let Some(key) = key {
            let Some(key_win) = self.windows.get(key) else {
                warn!("window_open: invalid key id");
                return None;
            };
            if key_win.is_pair() {
                warn!("window_open: key window may not be a pair");
                return None;
            }
            if !self.is_in_subtree(key, target) {
                warn!("window_open: key window outside the split subtree");
                return None;
            }
        }

        let (old_rect, old_parent) = {
            let target = self.windows.get(target)?;
            (target.rect, target.parent)
        };
        let new_leaf = self.create_window(Window::new_leaf(kind, rock))?;
        let (child1, child2) = if method.dir.is_backward() {
            (new_leaf, target)
        } else {
            (target, new_leaf)
        };
        let pair = PairData::new(child1, child2, method, size, key.or(Some(new_leaf)));
        let Some(pair_id) = self.create_window(Window::new_pair(pair)) else {
            self.destroy_window_record(new_leaf);
            return None;
        };

        if let Some(win) = self.windows.get_mut(pair_id) {
            win.parent = old_parent;
        }
        match old_parent {
            Some(grandparent) => self.replace_child(grandparent, target, pair_id),
            None => self.root = Some(pair_id),
        }
        if let Some(win) = self.windows.get_mut(target) {
            win.parent = Some(pair_id);
        }
        if let Some(win) = self.windows.get_mut(new_leaf) {
            win.parent = Some(pair_id);
        }

        self.layout(pair_id, old_rect);
        Some(new_leaf)
    }

    /// Close a window, destroying its subtree and stream.
    ///
    /// Closing a non-root window removes its parent pair as well and
    /// promotes the sibling into the pair's place; any surviving pair
    /// whose key window died degrades to literal sizing. Returns the
    /// closed window's final stream counters.
    pub fn close_window(&mut self, wid: WindowId) -> Option<StreamResult> {
        let Some(win) = self.windows.get(wid) else {
            warn!("window_close: invalid id");
            return None;
        };
        let result = win
            .stream
            .and_then(|sid| self.streams.get(sid))
            .map(Stream::result)
            .unwrap_or_default();

        if self.root == Some(wid) {
            self.destroy_subtree(wid);
            self.root = None;
            return Some(result);
        }

        let Some(parent_id) = self.windows.get(wid).and_then(|w| w.parent) else {
            warn!("window_close: window has no parent and is not the root");
            return None;
        };
        let Some(sibling) = self
            .windows
            .get(parent_id)
            .and_then(Window::pair)
            .and_then(|pd| pd.sibling_of(wid))
        else {
            warn!("window_close: inconsistent pair parent");
            return None;
        };
        let grandparent = self.windows.get(parent_id).and_then(|w| w.parent);

        self.mark_key_damage(wid);
        self.destroy_subtree(wid);
        self.destroy_window_record(parent_id);

        if let Some(win) = self.windows.get_mut(sibling) {
            win.parent = grandparent;
        }
        match grandparent {
            Some(grandparent) => self.replace_child(grandparent, parent_id, sibling),
            None => self.root = Some(sibling),
        }
        self.repair_damaged_keys();

        if let Some(root) = self.root {
            let screen = self.screen;
            self.layout(root, screen);
        }
        Some(result)
    }

    /// Re-run layout over the whole tree for a new screen size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::from_size(width, height);
        debug!(width, height, "screen resized");
        if let Some(root) = self.root {
            let screen = self.screen;
            self.layout(root, screen);
        }
    }

    /// Repaint the tree inside the last-computed rectangles. Never
    /// recomputes geometry.
    pub fn redraw(&mut self) {
        if let Some(root) = self.root {
            self.redraw_window(root);
        }
    }

    /// Change an existing pair's split parameters and re-lay-out its
    /// subtree in place. A `key` of `None` leaves the key unchanged;
    /// flipping the direction across the first/last boundary swaps the
    /// children so the sized child stays on the `dir` side.
    pub fn set_arrangement(
        &mut self,
        wid: WindowId,
        method: SplitMethod,
        size: u32,
        key: Option<WindowId>,
    ) {
        let Some(win) = self.windows.get(wid) else {
            warn!("window_set_arrangement: invalid id");
            return;
        };
        if !win.is_pair() {
            warn!("window_set_arrangement: not a pair window");
            return;
        }
        let rect = win.rect;
        if method.division == Division::Proportional && size > 100 {
            warn!(size, "window_set_arrangement: proportional size out of range");
            return;
        }
        if let Some(key) = key {
            let Some(key_win) = self.windows.get(key) else {
                warn!("window_set_arrangement: invalid key id");
                return;
            };
            if key_win.is_pair() {
                warn!("window_set_arrangement: key window may not be a pair");
                return;
            }
            if !self.is_in_subtree(key, wid) {
                warn!("window_set_arrangement: key window outside this pair");
                return;
            }
        }

        if let Some(pd) = self.windows.get_mut(wid).and_then(Window::pair_mut) {
            if pd.dir.is_backward() != method.dir.is_backward() {
                std::mem::swap(&mut pd.child1, &mut pd.child2);
            }
            pd.dir = method.dir;
            pd.division = method.division;
            pd.size = size;
            if key.is_some() {
                pd.key = key;
            }
        }
        self.layout(wid, rect);
    }

    /// A pair's split parameters: method, size, and key.
    #[must_use]
    pub fn get_arrangement(&self, wid: WindowId) -> Option<(SplitMethod, u32, Option<WindowId>)> {
        let Some(win) = self.windows.get(wid) else {
            warn!("window_get_arrangement: invalid id");
            return None;
        };
        let pd = win.pair()?;
        Some((SplitMethod::new(pd.dir, pd.division), pd.size, pd.key))
    }

    /// Next window in registry order; `None` starts from the beginning.
    #[must_use]
    pub fn window_iterate(&self, prev: Option<WindowId>) -> Option<(WindowId, u32)> {
        if let Some(prev) = prev
            && !self.windows.contains(prev)
        {
            warn!("window_iterate: invalid id");
            return None;
        }
        let next = self.windows.next_after(prev)?;
        Some((next, self.windows.get(next)?.rock))
    }

    /// A window's rock, or 0 for an invalid id.
    #[must_use]
    pub fn window_get_rock(&self, wid: WindowId) -> u32 {
        match self.windows.get(wid) {
            Some(win) => win.rock,
            None => {
                warn!("window_get_rock: invalid id");
                0
            }
        }
    }

    /// A window's discriminant.
    #[must_use]
    pub fn window_get_type(&self, wid: WindowId) -> Option<WindowType> {
        match self.windows.get(wid) {
            Some(win) => Some(win.window_type()),
            None => {
                warn!("window_get_type: invalid id");
                None
            }
        }
    }

    /// A window's enclosing pair, or `None` for the root.
    #[must_use]
    pub fn window_get_parent(&self, wid: WindowId) -> Option<WindowId> {
        match self.windows.get(wid) {
            Some(win) => win.parent,
            None => {
                warn!("window_get_parent: invalid id");
                None
            }
        }
    }

    /// The other child of a window's enclosing pair.
    #[must_use]
    pub fn window_get_sibling(&self, wid: WindowId) -> Option<WindowId> {
        let Some(win) = self.windows.get(wid) else {
            warn!("window_get_sibling: invalid id");
            return None;
        };
        let parent = win.parent?;
        self.windows
            .get(parent)
            .and_then(Window::pair)
            .and_then(|pd| pd.sibling_of(wid))
    }

    /// A window's rectangle from the last layout pass.
    #[must_use]
    pub fn window_get_rect(&self, wid: WindowId) -> Option<Rect> {
        match self.windows.get(wid) {
            Some(win) => Some(win.rect),
            None => {
                warn!("window_get_rect: invalid id");
                None
            }
        }
    }

    /// A window's own output stream.
    #[must_use]
    pub fn window_get_stream(&self, wid: WindowId) -> Option<StreamId> {
        match self.windows.get(wid) {
            Some(win) => win.stream,
            None => {
                warn!("window_get_stream: invalid id");
                None
            }
        }
    }

    /// A window's echo stream, if set.
    #[must_use]
    pub fn window_get_echo_stream(&self, wid: WindowId) -> Option<StreamId> {
        match self.windows.get(wid) {
            Some(win) => win.echo,
            None => {
                warn!("window_get_echo_stream: invalid id");
                None
            }
        }
    }

    /// Attach or detach a stream that mirrors everything written to the
    /// window. A window cannot echo to its own stream.
    pub fn window_set_echo_stream(&mut self, wid: WindowId, echo: Option<StreamId>) {
        let Some(win) = self.windows.get(wid) else {
            warn!("window_set_echo_stream: invalid window id");
            return;
        };
        if let Some(sid) = echo {
            if !self.streams.contains(sid) {
                warn!("window_set_echo_stream: invalid stream id");
                return;
            }
            if win.stream == Some(sid) {
                warn!("window_set_echo_stream: cannot echo a window to its own stream");
                return;
            }
        }
        if let Some(win) = self.windows.get_mut(wid) {
            win.echo = echo;
        }
    }

    /// Mark the window as awaiting a full line of input. Writes to it
    /// are rejected until the request is cancelled.
    pub fn request_line_input(&mut self, wid: WindowId) {
        match self.windows.get_mut(wid) {
            Some(win) => win.line_request = true,
            None => warn!("request_line_input: invalid id"),
        }
    }

    /// Clear a pending line-input request.
    pub fn cancel_line_input(&mut self, wid: WindowId) {
        match self.windows.get_mut(wid) {
            Some(win) => win.line_request = false,
            None => warn!("cancel_line_input: invalid id"),
        }
    }

    /// Whether a line-input request is pending on the window.
    #[must_use]
    pub fn line_request_pending(&self, wid: WindowId) -> bool {
        self.windows.get(wid).is_some_and(|win| win.line_request)
    }

    // ── Styles ─────────────────────────────────────────────────────────

    /// Apply a style hint; see [`StyleContext::set_hint`].
    pub fn set_style_hint(&mut self, scope: HintScope, class: u32, hint: Hint, val: i32) {
        self.styles.set_hint(scope, class, hint, val);
    }

    /// Clear a style hint back to its compiled default; see
    /// [`StyleContext::clear_hint`].
    pub fn clear_style_hint(&mut self, scope: HintScope, class: u32, hint: Hint) {
        self.styles.clear_hint(scope, class, hint);
    }

    /// Whether two style classes render distinguishably in a window.
    #[must_use]
    pub fn style_distinguish(&self, wid: WindowId, class1: u32, class2: u32) -> bool {
        let Some(win) = self.windows.get(wid) else {
            warn!("style_distinguish: invalid id");
            return false;
        };
        let Some(kind) = win.surface_kind() else {
            return false;
        };
        self.styles.distinguishable(kind, class1, class2)
    }

    /// A style hint's resolved value for a class in a window; see
    /// [`StyleContext::measure`].
    #[must_use]
    pub fn style_measure(&self, wid: WindowId, class: u32, hint: Hint) -> Option<u32> {
        let Some(win) = self.windows.get(wid) else {
            warn!("style_measure: invalid id");
            return None;
        };
        let kind = win.surface_kind()?;
        self.styles.measure(kind, class, hint)
    }

    // ── Streams ────────────────────────────────────────────────────────

    /// Open a stream over a caller-supplied buffer. Only `Read`,
    /// `Write`, and `ReadWrite` modes are legal; an absent buffer
    /// creates an inert stream. The buffer is returned when the stream
    /// closes.
    pub fn open_memory_stream(
        &mut self,
        buf: Option<Vec<u8>>,
        mode: FileMode,
        rock: u32,
    ) -> Option<StreamId> {
        if mode == FileMode::WriteAppend {
            warn!("stream_open_memory: illegal filemode");
            return None;
        }
        match self.streams.insert(Stream::memory(buf, mode, rock)) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "stream_open_memory: unable to create stream");
                None
            }
        }
    }

    /// Open a stream over the file a file reference names.
    pub fn open_file_stream(
        &mut self,
        fileref: FileRefId,
        mode: FileMode,
        rock: u32,
    ) -> Option<StreamId> {
        let Some(fref) = self.filerefs.get(fileref) else {
            warn!("stream_open_file: invalid fileref id");
            return None;
        };
        let file = match FileStream::open(&fref.path, fref.textmode, mode) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %fref.path.display(), %err, "stream_open_file: unable to open file");
                return None;
            }
        };
        match self.streams.insert(Stream::file(file, mode, rock)) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "stream_open_file: unable to create stream");
                None
            }
        }
    }

    /// Close a stream and report its final counters (and, for memory
    /// streams, hand the buffer back). Window streams close only as a
    /// side effect of window destruction.
    pub fn close_stream(&mut self, id: StreamId) -> Option<StreamResult> {
        let Some(stream) = self.streams.get(id) else {
            warn!("stream_close: invalid id");
            return None;
        };
        if matches!(stream.kind, StreamKind::Window(_)) {
            warn!("stream_close: cannot close window stream");
            return None;
        }
        self.release_stream(id)
    }

    /// Shutdown sweep: close every file stream, the only kind that
    /// needs finalization.
    pub fn close_all_file_streams(&mut self) {
        let files: Vec<StreamId> = self
            .streams
            .iter()
            .filter(|(_, stream)| matches!(stream.kind, StreamKind::File(_)))
            .map(|(id, _)| id)
            .collect();
        for id in files {
            self.release_stream(id);
        }
    }

    /// Next stream in registry order; `None` starts from the beginning.
    #[must_use]
    pub fn stream_iterate(&self, prev: Option<StreamId>) -> Option<(StreamId, u32)> {
        if let Some(prev) = prev
            && !self.streams.contains(prev)
        {
            warn!("stream_iterate: invalid id");
            return None;
        }
        let next = self.streams.next_after(prev)?;
        Some((next, self.streams.get(next)?.rock))
    }

    /// A stream's rock, or 0 for an invalid id.
    #[must_use]
    pub fn stream_get_rock(&self, id: StreamId) -> u32 {
        match self.streams.get(id) {
            Some(stream) => stream.rock,
            None => {
                warn!("stream_get_rock: invalid id");
                0
            }
        }
    }

    /// Select the stream the no-argument output calls write to, or
    /// clear it with `None`.
    pub fn set_current_stream(&mut self, id: Option<StreamId>) {
        match id {
            None => self.current = None,
            Some(id) if self.streams.contains(id) => self.current = Some(id),
            Some(_) => warn!("stream_set_current: invalid id"),
        }
    }

    /// The current output stream, if any.
    #[must_use]
    pub fn current_stream(&self) -> Option<StreamId> {
        self.current
    }

    /// Write one unit to the current stream; a no-op when none is set.
    pub fn put_char(&mut self, ch: u8) {
        if let Some(current) = self.current {
            self.put_bytes(current, &[ch], true);
        }
    }

    /// Write a string to the current stream.
    pub fn put_string(&mut self, s: &str) {
        if let Some(current) = self.current {
            self.put_bytes(current, s.as_bytes(), true);
        }
    }

    /// Write a buffer to the current stream.
    pub fn put_buffer(&mut self, buf: &[u8]) {
        if let Some(current) = self.current {
            self.put_bytes(current, buf, true);
        }
    }

    /// Write one unit to a specific stream.
    pub fn put_char_stream(&mut self, id: StreamId, ch: u8) {
        if !self.streams.contains(id) {
            warn!("put_char_stream: invalid id");
            return;
        }
        self.put_bytes(id, &[ch], true);
    }

    /// Write a string to a specific stream.
    pub fn put_string_stream(&mut self, id: StreamId, s: &str) {
        if !self.streams.contains(id) {
            warn!("put_string_stream: invalid id");
            return;
        }
        self.put_bytes(id, s.as_bytes(), true);
    }

    /// Write a buffer to a specific stream.
    pub fn put_buffer_stream(&mut self, id: StreamId, buf: &[u8]) {
        if !self.streams.contains(id) {
            warn!("put_buffer_stream: invalid id");
            return;
        }
        self.put_bytes(id, buf, true);
    }

    /// Set the output style on the current stream.
    pub fn set_style(&mut self, class: u32) {
        if let Some(current) = self.current {
            self.apply_style(current, class, true);
        }
    }

    /// Set the output style on a specific stream.
    pub fn set_style_stream(&mut self, id: StreamId, class: u32) {
        if !self.streams.contains(id) {
            warn!("set_style_stream: invalid id");
            return;
        }
        self.apply_style(id, class, true);
    }

    /// Read one unit from a stream, or `None` at end-of-data, on an
    /// unreadable stream, or for window streams (which are never
    /// directly readable).
    pub fn get_char_stream(&mut self, id: StreamId) -> Option<u8> {
        let Some(stream) = self.streams.get_mut(id) else {
            warn!("get_char_stream: invalid id");
            return None;
        };
        if !stream.readable {
            return None;
        }
        let result = match &mut stream.kind {
            StreamKind::Memory(Some(buf)) => buf.read_byte(),
            StreamKind::Memory(None) | StreamKind::Window(_) => None,
            StreamKind::File(file) => file.read_byte(),
        };
        if result.is_some() {
            stream.read_count = stream.read_count.wrapping_add(1);
        }
        result
    }

    /// Move a stream's position. Memory streams clamp into their valid
    /// data; window streams ignore seeks entirely (nothing is passed to
    /// the echo stream).
    pub fn set_position(&mut self, id: StreamId, pos: i32, mode: SeekMode) {
        let Some(stream) = self.streams.get_mut(id) else {
            warn!("stream_set_position: invalid id");
            return;
        };
        match &mut stream.kind {
            StreamKind::Memory(Some(buf)) => buf.seek(pos, mode),
            StreamKind::Memory(None) | StreamKind::Window(_) => {}
            StreamKind::File(file) => file.seek(pos, mode),
        }
    }

    /// A stream's position; window streams always report 0.
    pub fn get_position(&mut self, id: StreamId) -> u32 {
        let Some(stream) = self.streams.get_mut(id) else {
            warn!("stream_get_position: invalid id");
            return 0;
        };
        match &mut stream.kind {
            StreamKind::Memory(Some(buf)) => buf.position() as u32,
            StreamKind::Memory(None) | StreamKind::Window(_) => 0,
            StreamKind::File(file) => file.position(),
        }
    }

    /// Echo a completed input line into a stream: the buffer followed
    /// by a newline. Used by the line-input subsystem to mirror input
    /// into a window's echo stream.
    pub fn echo_line(&mut self, id: StreamId, line: &[u8]) {
        self.put_bytes(id, line, true);
        self.put_bytes(id, b"\n", true);
    }

    // ── File references ────────────────────────────────────────────────

    /// Create a file reference for a path.
    pub fn create_fileref(
        &mut self,
        path: impl Into<PathBuf>,
        textmode: bool,
        rock: u32,
    ) -> Option<FileRefId> {
        match self.filerefs.insert(FileRef::new(path, textmode, rock)) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "fileref_create: unable to allocate");
                None
            }
        }
    }

    /// Destroy a file reference. Streams already opened over it are
    /// unaffected.
    pub fn destroy_fileref(&mut self, id: FileRefId) {
        if self.filerefs.remove(id).is_none() {
            warn!("fileref_destroy: invalid id");
        }
    }

    /// Next file reference in registry order.
    #[must_use]
    pub fn fileref_iterate(&self, prev: Option<FileRefId>) -> Option<(FileRefId, u32)> {
        if let Some(prev) = prev
            && !self.filerefs.contains(prev)
        {
            warn!("fileref_iterate: invalid id");
            return None;
        }
        let next = self.filerefs.next_after(prev)?;
        Some((next, self.filerefs.get(next)?.rock))
    }

    /// A file reference's rock, or 0 for an invalid id.
    #[must_use]
    pub fn fileref_get_rock(&self, id: FileRefId) -> u32 {
        match self.filerefs.get(id) {
            Some(fref) => fref.rock,
            None => {
                warn!("fileref_get_rock: invalid id");
                0
            }
        }
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Write bytes into a stream. Window streams forward one unit at a
    /// time so interleaved style changes apply mid-buffer, then mirror
    /// the same bytes into the echo stream; `allow_echo` is cleared on
    /// that nested write, so forwarding is exactly one hop per call
    /// site.
    fn put_bytes(&mut self, id: StreamId, bytes: &[u8], allow_echo: bool) {
        let forwarded = {
            let Some(stream) = self.streams.get_mut(id) else {
                return;
            };
            if !stream.writable {
                return;
            }
            match &mut stream.kind {
                // The inert no-buffer form: a complete no-op, counters
                // included.
                StreamKind::Memory(None) => return,
                StreamKind::Memory(Some(buf)) => {
                    stream.write_count = stream.write_count.wrapping_add(bytes.len() as u32);
                    buf.write(bytes);
                    None
                }
                StreamKind::File(file) => {
                    stream.write_count = stream.write_count.wrapping_add(bytes.len() as u32);
                    file.write(bytes);
                    None
                }
                StreamKind::Window(win) => {
                    stream.write_count = stream.write_count.wrapping_add(bytes.len() as u32);
                    Some(*win)
                }
            }
        };

        if let Some(wid) = forwarded {
            let Some(win) = self.windows.get(wid) else {
                return;
            };
            if win.line_request {
                warn!("put: window has pending line request");
                return;
            }
            let kind = win.window_type();
            let echo = win.echo;
            if kind != WindowType::Pair {
                for &ch in bytes {
                    self.host.put_char(wid, kind, ch);
                }
            }
            if allow_echo && let Some(echo) = echo {
                self.put_bytes(echo, bytes, false);
            }
        }
    }

    /// Set the output style through a stream; only window streams carry
    /// style state. Forwards one hop to the echo stream like
    /// [`Session::put_bytes`].
    fn apply_style(&mut self, id: StreamId, raw: u32, allow_echo: bool) {
        let Some(stream) = self.streams.get(id) else {
            return;
        };
        if !stream.writable {
            return;
        }
        let StreamKind::Window(wid) = stream.kind else {
            return;
        };
        let class = StyleClass::from_raw(raw);
        let echo = {
            let Some(win) = self.windows.get_mut(wid) else {
                return;
            };
            win.style = class;
            win.echo
        };
        if allow_echo && let Some(echo) = echo {
            self.apply_style(echo, raw, false);
        }
    }

    /// Insert a window record together with its owned stream.
    fn create_window(&mut self, window: Window) -> Option<WindowId> {
        let wid = match self.windows.insert(window) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "window_open: unable to allocate window");
                return None;
            }
        };
        let sid = match self.streams.insert(Stream::for_window(wid)) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "window_open: unable to allocate window stream");
                self.windows.remove(wid);
                return None;
            }
        };
        if let Some(win) = self.windows.get_mut(wid) {
            win.stream = Some(sid);
        }
        Some(wid)
    }

    /// Remove one window record and its stream, detaching the current-
    /// stream and echo references that pointed at it.
    fn destroy_window_record(&mut self, wid: WindowId) {
        let stream = self.windows.remove(wid).and_then(|win| win.stream);
        if let Some(sid) = stream {
            if self.current == Some(sid) {
                self.current = None;
            }
            self.unecho_stream(sid);
            self.streams.remove(sid);
        }
    }

    /// Recursively destroy a window and everything beneath it.
    fn destroy_subtree(&mut self, wid: WindowId) {
        let children = self
            .windows
            .get(wid)
            .and_then(Window::pair)
            .map(|pd| (pd.child1, pd.child2));
        if let Some((child1, child2)) = children {
            self.destroy_subtree(child1);
            self.destroy_subtree(child2);
        }
        self.destroy_window_record(wid);
    }

    /// Close a non-window stream, returning counters and any memory
    /// buffer.
    fn release_stream(&mut self, id: StreamId) -> Option<StreamResult> {
        if self.current == Some(id) {
            self.current = None;
        }
        self.unecho_stream(id);
        let stream = self.streams.remove(id)?;
        let mut result = stream.result();
        if let StreamKind::Memory(Some(buf)) = stream.kind {
            result.buffer = Some(buf.into_data());
        }
        Some(result)
    }

    /// Detach a dying stream from every window that echoes into it.
    fn unecho_stream(&mut self, id: StreamId) {
        for (_, win) in self.windows.iter_mut() {
            if win.echo == Some(id) {
                win.echo = None;
            }
        }
    }

    /// Swap one child of a pair for another window.
    fn replace_child(&mut self, pair_id: WindowId, from: WindowId, to: WindowId) {
        if let Some(pd) = self.windows.get_mut(pair_id).and_then(Window::pair_mut) {
            if pd.child1 == from {
                pd.child1 = to;
            } else if pd.child2 == from {
                pd.child2 = to;
            }
        }
    }

    /// Whether `win` lies in the subtree rooted at `ancestor`
    /// (inclusive).
    fn is_in_subtree(&self, mut win: WindowId, ancestor: WindowId) -> bool {
        loop {
            if win == ancestor {
                return true;
            }
            match self.windows.get(win).and_then(|w| w.parent) {
                Some(parent) => win = parent,
                None => return false,
            }
        }
    }

    /// Flag every ancestor pair whose key lies inside the subtree about
    /// to be destroyed, so teardown never chases a dangling key.
    fn mark_key_damage(&mut self, doomed: WindowId) {
        let mut marks = Vec::new();
        let mut cursor = self.windows.get(doomed).and_then(|w| w.parent);
        while let Some(pid) = cursor {
            let Some(win) = self.windows.get(pid) else {
                break;
            };
            if let Some(pd) = win.pair()
                && let Some(key) = pd.key
                && self.is_in_subtree(key, doomed)
            {
                marks.push(pid);
            }
            cursor = win.parent;
        }
        for pid in marks {
            if let Some(pd) = self.windows.get_mut(pid).and_then(Window::pair_mut) {
                pd.keydamage = true;
            }
        }
    }

    /// Degrade every key-damaged pair to literal sizing.
    fn repair_damaged_keys(&mut self) {
        for (_, win) in self.windows.iter_mut() {
            if let WindowKind::Pair(pd) = &mut win.kind
                && pd.keydamage
            {
                pd.keydamage = false;
                pd.key = None;
            }
        }
    }

    /// Recursive layout pass: assign `rect`, then slice it between a
    /// pair's children or hand a leaf to the content collaborator.
    /// Geometry is always recomputed top-down, never patched.
    fn layout(&mut self, wid: WindowId, rect: Rect) {
        let (kind, pair) = {
            let Some(win) = self.windows.get_mut(wid) else {
                return;
            };
            win.rect = rect;
            win.damaged = true;
            (win.window_type(), win.pair().cloned())
        };
        trace!(?wid, ?kind, ?rect, "layout pass");
        let Some(pd) = pair else {
            self.host.arrange(wid, kind, rect);
            return;
        };

        let extent = if pd.dir.is_vertical() {
            rect.width
        } else {
            rect.height
        };
        let want = match pd.division {
            Division::Proportional => ((extent as u64 * pd.size as u64) / 100) as u16,
            Division::Fixed => match pd.key {
                Some(key) => self
                    .windows
                    .get(key)
                    .map(|win| win.window_type().fixed_extent(pd.size))
                    .unwrap_or_else(|| pd.size.min(u16::MAX as u32) as u16),
                None => pd.size.min(u16::MAX as u32) as u16,
            },
        };
        let border = self.child_draws_border(pd.child1) && self.child_draws_border(pd.child2);
        let split = compute_split(rect, pd.dir, want, border);

        if let Some(pd) = self.windows.get_mut(wid).and_then(Window::pair_mut) {
            pd.splitpos = split.splitpos;
            pd.splitwidth = split.splitwidth;
        }
        self.layout(pd.child1, split.first);
        self.layout(pd.child2, split.second);
    }

    fn child_draws_border(&self, wid: WindowId) -> bool {
        self.windows.get(wid).is_some_and(Window::draws_border)
    }

    /// Recursive repaint within last-computed rectangles.
    fn redraw_window(&mut self, wid: WindowId) {
        let (kind, rect, pair) = {
            let Some(win) = self.windows.get_mut(wid) else {
                return;
            };
            win.damaged = false;
            (win.window_type(), win.rect, win.pair().cloned())
        };
        let Some(pd) = pair else {
            self.host.redraw(wid, kind, rect);
            return;
        };
        if pd.splitwidth > 0 {
            let border = if pd.dir.is_vertical() {
                Rect::new(pd.splitpos, rect.y, pd.splitwidth, rect.height)
            } else {
                Rect::new(rect.x, pd.splitpos, rect.width, pd.splitwidth)
            };
            self.host.draw_border(border);
        }
        self.redraw_window(pd.child1);
        self.redraw_window(pd.child2);
    }
}
