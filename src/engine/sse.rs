/// 빈 줄로 구분된 SSE 이벤트 하나이다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` 필드. 없으면 `message`로 간주한다.
    pub event: Option<String>,
    /// 여러 `data:` 줄을 개행으로 이은 본문.
    pub data: String,
}

impl SseFrame {
    pub fn name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

/// 청크 경계와 무관하게 SSE 이벤트를 복원하는 디코더이다.
///
/// UTF-8 문자가 청크 사이에서 잘려도 깨지지 않도록 바이트 단위로 버퍼링한다.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 수신한 청크를 넣고 완성된 이벤트를 반환한다.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.feed_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// 스트림 종료 시 빈 줄 없이 남은 이벤트를 마저 꺼낸다.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            self.feed_line(&line);
        }
        self.dispatch()
    }

    fn feed_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id, retry는 재연결을 하지 않으므로 사용하지 않는다.
            _ => {}
        }
        None
    }

    /// 이름이 붙은 이벤트는 `data:` 줄이 없어도 빈 본문으로 내보낸다.
    fn dispatch(&mut self) -> Option<SseFrame> {
        if self.data.is_empty() && self.event.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: self.event.take(),
            data,
        })
    }
}
