use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Id,
    En,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Id => "id",
            Locale::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" | "id_id" => Ok(Locale::Id),
            "en" | "en-us" | "en_us" | "en-gb" | "en_gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Every user-facing string the sidecar hands to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    InitFailed,
    LoadFailed,
    SaveFailed,
    DeleteFailed,
    MissingField,
    NotANumber,
    OutOfRange,
    UnknownCourse,
    NotFound,
    FormClosed,
    FormAlreadyOpen,
    NoPendingDelete,
    NoWorkspace,
    Created,
    Updated,
    Deleted,
    ConfirmDelete,
    EmptyList,
    EmptyListHint,
    FormTitleAdd,
    FormTitleEdit,
}

impl Message {
    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Id => self.indonesian(),
            Locale::En => self.english(),
        }
    }

    fn indonesian(self) -> &'static str {
        match self {
            Message::InitFailed => "Gagal menginisialisasi aplikasi",
            Message::LoadFailed => "Gagal memuat data mahasiswa",
            Message::SaveFailed => "Gagal menyimpan data mahasiswa!",
            Message::DeleteFailed => "Gagal menghapus data!",
            Message::MissingField => "Semua field harus diisi!",
            Message::NotANumber => "Nilai harus berupa angka yang valid!",
            Message::OutOfRange => "Nilai harus antara 0-100!",
            Message::UnknownCourse => "Mata kuliah tidak dikenal!",
            Message::NotFound => "Data mahasiswa tidak ditemukan",
            Message::FormClosed => "Formulir belum dibuka",
            Message::FormAlreadyOpen => "Formulir sedang dibuka",
            Message::NoPendingDelete => "Tidak ada penghapusan yang menunggu konfirmasi",
            Message::NoWorkspace => "Pilih workspace terlebih dahulu",
            Message::Created => "Data mahasiswa berhasil disimpan!",
            Message::Updated => "Data mahasiswa berhasil diupdate!",
            Message::Deleted => "Data berhasil dihapus!",
            Message::ConfirmDelete => "Apakah Anda yakin ingin menghapus data ini?",
            Message::EmptyList => "Belum ada data mahasiswa",
            Message::EmptyListHint => "Tekan tombol \"Tambah Data\" untuk menambah data baru",
            Message::FormTitleAdd => "Tambah Data Mahasiswa",
            Message::FormTitleEdit => "Edit Data Mahasiswa",
        }
    }

    fn english(self) -> &'static str {
        match self {
            Message::InitFailed => "Failed to initialize the application",
            Message::LoadFailed => "Failed to load student data",
            Message::SaveFailed => "Failed to save student data!",
            Message::DeleteFailed => "Failed to delete data!",
            Message::MissingField => "All fields are required!",
            Message::NotANumber => "Scores must be valid numbers!",
            Message::OutOfRange => "Scores must be between 0 and 100!",
            Message::UnknownCourse => "Unknown course!",
            Message::NotFound => "Student record not found",
            Message::FormClosed => "The form is not open",
            Message::FormAlreadyOpen => "The form is already open",
            Message::NoPendingDelete => "No delete is waiting for confirmation",
            Message::NoWorkspace => "Select a workspace first",
            Message::Created => "Student data saved!",
            Message::Updated => "Student data updated!",
            Message::Deleted => "Data deleted!",
            Message::ConfirmDelete => "Are you sure you want to delete this record?",
            Message::EmptyList => "No student data yet",
            Message::EmptyListHint => "Press \"Add Data\" to add a new record",
            Message::FormTitleAdd => "Add Student Data",
            Message::FormTitleEdit => "Edit Student Data",
        }
    }
}
