pub mod external_diarizer;
