//! Message codes carried in the bus header.
//!
//! The code alone determines the shape of `args` — there is no separate
//! schema negotiation. Grouped here the same way the upstream debug table
//! groups them: general/db, to main, to player, from player, to/from
//! manageui/playerui, to/from starterui, to/from web servers, to/from
//! marquee, to/from dbupdate, to/from bpm counter, test-suite.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum MessageCode {
    Null = 0,
    ExitRequest = 1,
    Handshake = 2,
    SocketClose = 3,
    DbReload = 4,
    DbLoaded = 5,
    DbEntryUpdate = 6,
    DbEntryRemove = 7,
    DbEntryUnremove = 8,
    WindowFind = 9,

    // to main
    GetStatus = 10,
    MusicqInsert = 11,
    MusicqMoveDown = 12,
    MusicqMoveTop = 13,
    MusicqMoveUp = 14,
    MusicqRemove = 15,
    MusicqSwap = 16,
    MusicqSetPlayback = 17,
    MusicqSetLen = 18,
    MusicqTogglePause = 19,
    MusicqTruncate = 20,
    CmdPlay = 21,
    CmdPlayPause = 22,
    CmdNextSongPlay = 23,
    QueueClear = 24,
    QueueDance = 25,
    QueuePlaylist = 26,
    QueueSwitchEmpty = 27,
    QueueMix = 28,
    StartMarquee = 29,
    StopMarquee = 30,
    PlOverrideStopTime = 31,
    PlClearQueue = 32,

    // to player
    PlayerVolMute = 33,
    PlayerVolume = 34,
    PlayerSupport = 35,
    PlayFade = 36,
    PlayNextSong = 37,
    PlayPauseAtEnd = 38,
    PlayPause = 39,
    PlayPlay = 40,
    PlayPlayPause = 41,
    PlayRepeat = 42,
    PlaySeek = 43,
    PlaySongBegin = 44,
    PlaySpeed = 45,
    PlayStop = 46,
    PlayResetVolume = 47,
    SongPlay = 48,
    SongPrep = 49,
    SongClearPrep = 50,
    SetPlaybackGap = 51,
    SetPlaybackFadeIn = 52,
    SetPlaybackFadeOut = 53,
    SetPlaybackCrossfade = 54,
    MainReady = 55,
    MusicqDataSuspend = 56,
    MusicqDataResume = 57,

    // from player
    PlayPauseAtEndState = 58,
    PlaybackBegin = 59,
    PlaybackFinishStop = 60,
    PlaybackFinish = 61,
    PlayerState = 62,
    PlayerStatusData = 63,
    PlayerAnnFinished = 64,

    // to/from manageui/playerui
    MusicQueueData = 65,
    QueueSwitch = 66,
    SongSelect = 67,
    Finished = 68,
    SongFinish = 69,
    MainStartReconn = 70,
    MainStartReattach = 71,
    MainReqStatus = 72,
    MainCurrPlay = 73,
    DbEntryTempAdd = 74,
    MainReqQueueInfo = 75,
    MainQueueInfo = 76,
    ProcessingFinish = 77,
    ProcessingFail = 78,

    // to/from starterui
    StartMain = 79,
    StopMain = 80,
    ProcessActive = 81,
    ReqProcessActive = 82,
    DebugLevel = 83,

    // to/from web servers
    DanceListData = 84,
    GetDanceList = 85,
    GetPlaylistList = 86,
    MarqueeData = 87,
    MusicqStatusData = 88,
    PlaylistListData = 89,
    CurrSongData = 90,

    // to/from marquee
    MarqueeTimer = 91,
    MarqueeSetFontSz = 92,
    MarqueeFontSizes = 93,
    MarqueeHide = 94,
    MarqueeShow = 95,
    MarqueeStatus = 96,

    // to/from dbupdate
    DbStopReq = 97,
    DbProgress = 98,
    DbStatusMsg = 99,
    DbFinish = 100,
    DbWait = 101,
    DbWaitFinish = 102,
    /// to the tag-reading collaborator: check one file's tags.
    DbFileChk = 103,
    /// from the tag-reading collaborator: the tag dictionary for one file.
    DbFileTags = 104,

    // to/from bpm counter
    BpmTimeSig = 105,
    BpmSet = 106,

    // test-suite
    ChkMainMusicq = 107,
    ChkPlayerStatus = 108,
    ChkPlayerSong = 109,
    ChkMainResetSent = 110,
    ChkWaitPrep = 111,
    ChkSetDelay = 112,
}

impl MessageCode {
    pub fn as_str(self) -> &'static str {
        use MessageCode::*;
        match self {
            Null => "null",
            ExitRequest => "exit-request",
            Handshake => "handshake",
            SocketClose => "socket-close",
            DbReload => "db-reload",
            DbLoaded => "db-loaded",
            DbEntryUpdate => "db-entry-update",
            DbEntryRemove => "db-entry-remove",
            DbEntryUnremove => "db-entry-unremove",
            WindowFind => "window-find",
            GetStatus => "get-status",
            MusicqInsert => "musicq-insert",
            MusicqMoveDown => "musicq-move-down",
            MusicqMoveTop => "musicq-move-top",
            MusicqMoveUp => "musicq-move-up",
            MusicqRemove => "musicq-remove",
            MusicqSwap => "musicq-swap",
            MusicqSetPlayback => "musicq-set-playback",
            MusicqSetLen => "musicq-set-len",
            MusicqTogglePause => "musicq-toggle-pause",
            MusicqTruncate => "musicq-truncate",
            CmdPlay => "cmd-play",
            CmdPlayPause => "cmd-playpause",
            CmdNextSongPlay => "cmd-nextsong-play",
            QueueClear => "queue-clear",
            QueueDance => "queue-dance",
            QueuePlaylist => "queue-playlist",
            QueueSwitchEmpty => "queue-switch-empty",
            QueueMix => "queue-mix",
            StartMarquee => "start-marquee",
            StopMarquee => "stop-marquee",
            PlOverrideStopTime => "pl-override-stop-time",
            PlClearQueue => "pl-clear-queue",
            PlayerVolMute => "player-vol-mute",
            PlayerVolume => "player-volume",
            PlayerSupport => "player-support",
            PlayFade => "play-fade",
            PlayNextSong => "play-nextsong",
            PlayPauseAtEnd => "play-pauseatend",
            PlayPause => "play-pause",
            PlayPlay => "play-play",
            PlayPlayPause => "play-playpause",
            PlayRepeat => "play-repeat",
            PlaySeek => "play-seek",
            PlaySongBegin => "play-song-begin",
            PlaySpeed => "play-speed",
            PlayStop => "play-stop",
            PlayResetVolume => "play-reset-volume",
            SongPlay => "song-play",
            SongPrep => "song-prep",
            SongClearPrep => "song-clear-prep",
            SetPlaybackGap => "set-playback-gap",
            SetPlaybackFadeIn => "set-playback-fadein",
            SetPlaybackFadeOut => "set-playback-fadeout",
            SetPlaybackCrossfade => "set-playback-crossfade",
            MainReady => "main-ready",
            MusicqDataSuspend => "musicq-data-suspend",
            MusicqDataResume => "musicq-data-resume",
            PlayPauseAtEndState => "play-pauseatend-state",
            PlaybackBegin => "playback-begin",
            PlaybackFinishStop => "playback-finish-stop",
            PlaybackFinish => "playback-finish",
            PlayerState => "player-state",
            PlayerStatusData => "player-status-data",
            PlayerAnnFinished => "player-ann-finished",
            MusicQueueData => "music-queue-data",
            QueueSwitch => "queue-switch",
            SongSelect => "song-select",
            Finished => "finished",
            SongFinish => "song-finish",
            MainStartReconn => "main-start-reconn",
            MainStartReattach => "main-start-reattach",
            MainReqStatus => "main-req-status",
            MainCurrPlay => "main-curr-play",
            DbEntryTempAdd => "db-entry-temp-add",
            MainReqQueueInfo => "main-req-queue-info",
            MainQueueInfo => "main-queue-info",
            ProcessingFinish => "processing-finish",
            ProcessingFail => "processing-fail",
            StartMain => "start-main",
            StopMain => "stop-main",
            ProcessActive => "process-active",
            ReqProcessActive => "req-process-active",
            DebugLevel => "debug-level",
            DanceListData => "dance-list-data",
            GetDanceList => "get-dance-list",
            GetPlaylistList => "get-playlist-list",
            MarqueeData => "marquee-data",
            MusicqStatusData => "musicq-status-data",
            PlaylistListData => "playlist-list-data",
            CurrSongData => "curr-song-data",
            MarqueeTimer => "marquee-timer",
            MarqueeSetFontSz => "marquee-set-font-sz",
            MarqueeFontSizes => "marquee-font-sizes",
            MarqueeHide => "marquee-hide",
            MarqueeShow => "marquee-show",
            MarqueeStatus => "marquee-status",
            DbStopReq => "db-stop-req",
            DbProgress => "db-progress",
            DbStatusMsg => "db-status-msg",
            DbFinish => "db-finish",
            DbWait => "db-wait",
            DbWaitFinish => "db-wait-finish",
            DbFileChk => "db-file-chk",
            DbFileTags => "db-file-tags",
            BpmTimeSig => "bpm-timesig",
            BpmSet => "bpm-set",
            ChkMainMusicq => "chk-main-musicq",
            ChkPlayerStatus => "chk-player-status",
            ChkPlayerSong => "chk-player-song",
            ChkMainResetSent => "chk-main-reset-sent",
            ChkWaitPrep => "chk-wait-prep",
            ChkSetDelay => "chk-set-delay",
        }
    }

    /// Messages this noisy are suppressed from debug logging at the send
    /// site (status floods at playback tick rate).
    pub fn is_high_frequency(self) -> bool {
        matches!(self, MessageCode::MusicqStatusData | MessageCode::PlayerStatusData)
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("message code {0} out of range")]
pub struct MessageRangeError(pub u16);

impl TryFrom<u16> for MessageCode {
    type Error = MessageRangeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        use MessageCode::*;
        const TABLE: &[MessageCode] = &[
            Null, ExitRequest, Handshake, SocketClose, DbReload, DbLoaded, DbEntryUpdate,
            DbEntryRemove, DbEntryUnremove, WindowFind, GetStatus, MusicqInsert, MusicqMoveDown,
            MusicqMoveTop, MusicqMoveUp, MusicqRemove, MusicqSwap, MusicqSetPlayback,
            MusicqSetLen, MusicqTogglePause, MusicqTruncate, CmdPlay, CmdPlayPause,
            CmdNextSongPlay, QueueClear, QueueDance, QueuePlaylist, QueueSwitchEmpty, QueueMix,
            StartMarquee, StopMarquee, PlOverrideStopTime, PlClearQueue, PlayerVolMute,
            PlayerVolume, PlayerSupport, PlayFade, PlayNextSong, PlayPauseAtEnd, PlayPause,
            PlayPlay, PlayPlayPause, PlayRepeat, PlaySeek, PlaySongBegin, PlaySpeed, PlayStop,
            PlayResetVolume, SongPlay, SongPrep, SongClearPrep, SetPlaybackGap,
            SetPlaybackFadeIn, SetPlaybackFadeOut, SetPlaybackCrossfade, MainReady,
            MusicqDataSuspend, MusicqDataResume, PlayPauseAtEndState, PlaybackBegin,
            PlaybackFinishStop, PlaybackFinish, PlayerState, PlayerStatusData, PlayerAnnFinished,
            MusicQueueData, QueueSwitch, SongSelect, Finished, SongFinish, MainStartReconn,
            MainStartReattach, MainReqStatus, MainCurrPlay, DbEntryTempAdd, MainReqQueueInfo,
            MainQueueInfo, ProcessingFinish, ProcessingFail, StartMain, StopMain, ProcessActive,
            ReqProcessActive, DebugLevel, DanceListData, GetDanceList, GetPlaylistList,
            MarqueeData, MusicqStatusData, PlaylistListData, CurrSongData, MarqueeTimer,
            MarqueeSetFontSz, MarqueeFontSizes, MarqueeHide, MarqueeShow, MarqueeStatus,
            DbStopReq, DbProgress, DbStatusMsg, DbFinish, DbWait, DbWaitFinish, DbFileChk,
            DbFileTags, BpmTimeSig, BpmSet, ChkMainMusicq, ChkPlayerStatus, ChkPlayerSong,
            ChkMainResetSent, ChkWaitPrep, ChkSetDelay,
        ];
        TABLE
            .iter()
            .copied()
            .find(|code| *code as u16 == value)
            .ok_or(MessageRangeError(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_declared_code() {
        let codes = [
            MessageCode::Null,
            MessageCode::Handshake,
            MessageCode::SocketClose,
            MessageCode::DbFileChk,
            MessageCode::DbFileTags,
            MessageCode::ChkSetDelay,
        ];
        for code in codes {
            let raw = code as u16;
            assert_eq!(MessageCode::try_from(raw).unwrap(), code);
        }
    }

    #[test]
    fn high_frequency_messages_are_flagged() {
        assert!(MessageCode::PlayerStatusData.is_high_frequency());
        assert!(MessageCode::MusicqStatusData.is_high_frequency());
        assert!(!MessageCode::Handshake.is_high_frequency());
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert!(MessageCode::try_from(9999).is_err());
    }
}
