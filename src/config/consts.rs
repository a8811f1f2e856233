// src/config/consts.rs

// Net config
pub const ROOT_URL: &str = "http://didel.script.univ-paris-diderot.fr";
pub const USER_AGENT: &str = "didel-cli/0.4";

// CAS single sign-on
pub const CAS_LOGIN_URL: &str = "https://auth.univ-paris-diderot.fr/cas/login";
pub const CAS_LOGOUT_URL: &str = "https://auth.univ-paris-diderot.fr/cas/logout";
pub const CAS_LOGIN_OK: &str = "Log In Successful";
pub const CAS_LOGOUT_OK: &str = "Logout successful";

// Portal pages
pub const PROFILE_PATH: &str = "/claroline/auth/profile.php";
pub const COURSES_PATH: &str = "/claroline/auth/courses.php";

// Wire contract. Field names and commands are the portal's own; they must
// match bit-exact or the portal silently ignores the request.
pub const CMD_ENROLL: &str = "exReg";
pub const CMD_UNENROLL: &str = "exUnreg";
pub const ENROLL_OK: &str = "Vous êtes désormais inscrit";
pub const UNENROLL_OK: &str = "Vous avez été désinscrit";

pub const FIELD_FORM_ID: &str = "claroFormId";
pub const SUBMIT_FORM_ID: &str = "wrkSubmit";
pub const FIELD_TITLE: &str = "wrkTitle";
pub const FIELD_AUTHOR: &str = "wrkAuthor";
pub const FIELD_TEXT: &str = "wrkTxt";
pub const FIELD_FILE: &str = "wrkFile";

// Documents pages print dates as "02.10.2014"
pub const PORTAL_DATE_FMT: &str = "%d.%m.%Y";

// Local config
pub const CONFIG_FILE: &str = ".didel.toml";
